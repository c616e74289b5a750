use crate::{
    error::{AppError, AppResult},
    models::{report, Category, Report, ReportModel},
    utils::sanitize_text,
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

pub const STATUS_REPORTED: &str = "reported";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_CLEANED: &str = "cleaned";

/// The lifecycle only ever moves forward: a cleaned report stays cleaned,
/// and assigning a crew can be skipped entirely.
pub fn is_valid_transition(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        (STATUS_REPORTED, STATUS_IN_PROGRESS)
            | (STATUS_REPORTED, STATUS_CLEANED)
            | (STATUS_IN_PROGRESS, STATUS_CLEANED)
    )
}

pub struct NewReport {
    pub category_id: i32,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: String,
    pub tags: Vec<String>,
    pub is_anonymous: bool,
}

pub struct ReportService {
    db: DatabaseConnection,
}

impl ReportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: i32, input: NewReport) -> AppResult<ReportModel> {
        Category::find_by_id(input.category_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::Validation("Unknown category".to_string()))?;

        let description = sanitize_text(input.description.trim());
        if description.is_empty() {
            return Err(AppError::Validation(
                "Description must not be empty".to_string(),
            ));
        }

        let tags: Vec<String> = input
            .tags
            .iter()
            .map(|t| sanitize_text(t.trim()))
            .filter(|t| !t.is_empty())
            .collect();

        let now = chrono::Utc::now().naive_utc();
        let new_report = report::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            category_id: sea_orm::ActiveValue::Set(input.category_id),
            is_anonymous: sea_orm::ActiveValue::Set(input.is_anonymous),
            location: sea_orm::ActiveValue::Set(sanitize_text(input.location.trim())),
            latitude: sea_orm::ActiveValue::Set(input.latitude),
            longitude: sea_orm::ActiveValue::Set(input.longitude),
            photo_url: sea_orm::ActiveValue::Set(input.photo_url),
            after_photo_url: sea_orm::ActiveValue::Set(None),
            description: sea_orm::ActiveValue::Set(description),
            tags: sea_orm::ActiveValue::Set(serde_json::json!(tags)),
            upvote_count: sea_orm::ActiveValue::Set(0),
            status: sea_orm::ActiveValue::Set(STATUS_REPORTED.to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let created = new_report.insert(&self.db).await?;
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<ReportModel> {
        Report::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Advance a report through its lifecycle.
    ///
    /// The update is guarded on the previous status so two authorities
    /// racing on the same report cannot double-apply a transition; the
    /// loser matches zero rows and gets Conflict.
    pub async fn update_status(
        &self,
        report_id: i32,
        new_status: &str,
        after_photo_url: Option<String>,
    ) -> AppResult<ReportModel> {
        if new_status != STATUS_IN_PROGRESS && new_status != STATUS_CLEANED {
            return Err(AppError::Validation(format!(
                "Invalid status '{new_status}'"
            )));
        }

        let existing = self.get_by_id(report_id).await?;
        if !is_valid_transition(&existing.status, new_status) {
            return Err(AppError::Conflict(format!(
                "Cannot move report from '{}' to '{}'",
                existing.status, new_status
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        let mut update = Report::update_many()
            .col_expr(report::Column::Status, Expr::value(new_status))
            .col_expr(report::Column::UpdatedAt, Expr::value(now))
            .filter(report::Column::Id.eq(report_id))
            .filter(report::Column::Status.eq(existing.status.clone()));

        if let Some(url) = &after_photo_url {
            update = update.col_expr(report::Column::AfterPhotoUrl, Expr::value(url.clone()));
        }

        let result = update.exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::Conflict(
                "Report was updated concurrently".to_string(),
            ));
        }

        self.get_by_id(report_id).await
    }

    /// Delete a report. Only the author or an admin may do this; points
    /// earned through it are rolled back by the caller.
    pub async fn delete(&self, report_id: i32, user_id: i32, is_admin: bool) -> AppResult<()> {
        let existing = self.get_by_id(report_id).await?;
        if existing.user_id != user_id && !is_admin {
            return Err(AppError::Forbidden);
        }

        Report::delete_by_id(report_id).exec(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_can_move_to_in_progress() {
        assert!(is_valid_transition(STATUS_REPORTED, STATUS_IN_PROGRESS));
    }

    #[test]
    fn reported_can_move_straight_to_cleaned() {
        assert!(is_valid_transition(STATUS_REPORTED, STATUS_CLEANED));
    }

    #[test]
    fn in_progress_can_move_to_cleaned() {
        assert!(is_valid_transition(STATUS_IN_PROGRESS, STATUS_CLEANED));
    }

    #[test]
    fn cleaned_is_terminal() {
        assert!(!is_valid_transition(STATUS_CLEANED, STATUS_REPORTED));
        assert!(!is_valid_transition(STATUS_CLEANED, STATUS_IN_PROGRESS));
    }

    #[test]
    fn no_backwards_transition() {
        assert!(!is_valid_transition(STATUS_IN_PROGRESS, STATUS_REPORTED));
    }

    #[test]
    fn same_status_is_not_a_transition() {
        assert!(!is_valid_transition(STATUS_REPORTED, STATUS_REPORTED));
        assert!(!is_valid_transition(STATUS_CLEANED, STATUS_CLEANED));
    }
}
