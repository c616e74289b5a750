use crate::{
    error::AppResult,
    models::{report, user, Comment, Report, User},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};
use serde::Serialize;
use utoipa::ToSchema;

pub struct DashboardService {
    db: DatabaseConnection,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_reports: u64,
    pub reported: u64,
    pub in_progress: u64,
    pub cleaned: u64,
    pub total_users: u64,
    pub total_comments: u64,
    pub reports_today: u64,
    pub cleaned_today: u64,
}

impl DashboardService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_stats(&self) -> AppResult<DashboardStats> {
        let total_reports = Report::find().count(&self.db).await?;
        let reported = self.count_by_status("reported").await?;
        let in_progress = self.count_by_status("in_progress").await?;
        let cleaned = self.count_by_status("cleaned").await?;
        let total_users = User::find().count(&self.db).await?;
        let total_comments = Comment::find().count(&self.db).await?;

        let today = chrono::Utc::now().naive_utc().date();
        let today_start = today.and_hms_opt(0, 0, 0).unwrap_or_default();

        let reports_today = Report::find()
            .filter(report::Column::CreatedAt.gte(today_start))
            .count(&self.db)
            .await?;

        let cleaned_today = Report::find()
            .filter(report::Column::Status.eq("cleaned"))
            .filter(report::Column::UpdatedAt.gte(today_start))
            .count(&self.db)
            .await?;

        Ok(DashboardStats {
            total_reports,
            reported,
            in_progress,
            cleaned,
            total_users,
            total_comments,
            reports_today,
            cleaned_today,
        })
    }

    async fn count_by_status(&self, status: &str) -> AppResult<u64> {
        let count = Report::find()
            .filter(report::Column::Status.eq(status))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    /// Promote a user to the authority role so they can work the dashboard.
    pub async fn grant_authority(&self, user_id: i32) -> AppResult<crate::models::UserModel> {
        let existing = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(crate::error::AppError::NotFound)?;

        let mut active: user::ActiveModel = existing.into();
        active.role = sea_orm::ActiveValue::Set("authority".to_string());
        active.is_verified_authority = sea_orm::ActiveValue::Set(true);
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());
        let updated = active.update(&self.db).await?;
        Ok(updated)
    }
}
