use crate::{
    error::{AppError, AppResult},
    models::{comment, Report},
    services::feed::PLACEHOLDER_AVATAR,
    utils::sanitize_text,
};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, FromQueryResult, Statement,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, FromQueryResult)]
struct CommentRow {
    id: i32,
    report_id: i32,
    user_id: i32,
    author_username: String,
    author_avatar_url: Option<String>,
    content: String,
    created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentView {
    pub id: i32,
    pub report_id: i32,
    pub author_id: i32,
    pub author_username: String,
    pub author_avatar_url: String,
    pub content: String,
    pub created_at: chrono::NaiveDateTime,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            report_id: row.report_id,
            author_id: row.user_id,
            author_username: row.author_username,
            author_avatar_url: row
                .author_avatar_url
                .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_string()),
            content: row.content,
            created_at: row.created_at,
        }
    }
}

pub struct CommentService {
    db: DatabaseConnection,
}

impl CommentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Comments on a report, oldest first, with author identity joined in.
    /// Comments are never anonymous.
    pub async fn list_by_report(&self, report_id: i32) -> AppResult<Vec<CommentView>> {
        Report::find_by_id(report_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let rows = CommentRow::find_by_statement(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT cm.id, cm.report_id, cm.user_id, \
                u.username AS author_username, u.avatar_url AS author_avatar_url, \
                cm.content, cm.created_at \
                FROM comments cm \
                JOIN users u ON u.id = cm.user_id \
                WHERE cm.report_id = $1 \
                ORDER BY cm.created_at ASC",
            vec![report_id.into()],
        ))
        .all(&self.db)
        .await?;

        Ok(rows.into_iter().map(CommentView::from).collect())
    }

    /// Append a comment. Comments are immutable once posted.
    pub async fn create(
        &self,
        report_id: i32,
        user_id: i32,
        content: &str,
    ) -> AppResult<crate::models::CommentModel> {
        Report::find_by_id(report_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let content = sanitize_text(content.trim());
        if content.is_empty() {
            return Err(AppError::Validation(
                "Comment must not be empty".to_string(),
            ));
        }
        if content.len() > 2000 {
            return Err(AppError::Validation(
                "Comment must be at most 2000 characters".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let new_comment = comment::ActiveModel {
            report_id: sea_orm::ActiveValue::Set(report_id),
            user_id: sea_orm::ActiveValue::Set(user_id),
            content: sea_orm::ActiveValue::Set(content),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let created = new_comment.insert(&self.db).await?;
        Ok(created)
    }
}
