use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Statement,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Public profile: everything a stranger may see about a reporter.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub avatar_url: Option<String>,
    pub points: i32,
    pub role: String,
    pub is_verified_authority: bool,
    pub report_count: i64,
    pub cleaned_count: i64,
    pub created_at: chrono::NaiveDateTime,
}

pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<UserModel> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Profile with report counts. Anonymous reports stay out of the
    /// public tally.
    pub async fn get_profile(&self, username: &str) -> AppResult<UserProfile> {
        let user = self.get_by_username(username).await?;

        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                "SELECT COUNT(*) FILTER (WHERE is_anonymous = FALSE) AS report_count, \
                    COUNT(*) FILTER (WHERE is_anonymous = FALSE AND status = 'cleaned') AS cleaned_count \
                    FROM reports WHERE user_id = $1",
                vec![user.id.into()],
            ))
            .await?
            .ok_or(AppError::Internal(anyhow::anyhow!("Count query failed")))?;

        let report_count: i64 = row.try_get_by("report_count")?;
        let cleaned_count: i64 = row.try_get_by("cleaned_count")?;

        Ok(UserProfile {
            id: user.id,
            username: user.username,
            avatar_url: user.avatar_url,
            points: user.points,
            role: user.role,
            is_verified_authority: user.is_verified_authority,
            report_count,
            cleaned_count,
            created_at: user.created_at,
        })
    }

    /// Update only the avatar URL (used by upload handler).
    pub async fn update_avatar_url(&self, user_id: i32, url: &str) -> AppResult<UserModel> {
        let existing = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();

        let mut active: user::ActiveModel = existing.into();
        active.avatar_url = sea_orm::ActiveValue::Set(Some(url.to_string()));
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }
}
