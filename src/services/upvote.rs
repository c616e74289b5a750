use crate::{
    error::{AppError, AppResult},
    models::{upvote, Report, Upvote},
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Statement,
    TransactionTrait,
};

pub struct UpvoteService {
    db: DatabaseConnection,
}

#[derive(Debug, Clone, Copy)]
pub struct UpvoteChange {
    /// Whether the caller's upvote exists after the toggle.
    pub upvoted: bool,
    /// False when a concurrent request already applied the same change;
    /// the counter was not touched and no points should move.
    pub changed: bool,
    pub upvote_count: i32,
    pub author_user_id: i32,
}

impl UpvoteService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Toggle the caller's upvote on a report.
    ///
    /// First call adds the upvote, the next one removes it. The denormalized
    /// counter on the report row moves in the same transaction as the row,
    /// only when the row actually changed, and never drops below zero.
    pub async fn toggle(&self, user_id: i32, report_id: i32) -> AppResult<UpvoteChange> {
        let report = Report::find_by_id(report_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        let author_user_id = report.user_id;

        let txn = self.db.begin().await?;

        let existing = Upvote::find()
            .filter(upvote::Column::UserId.eq(user_id))
            .filter(upvote::Column::ReportId.eq(report_id))
            .one(&txn)
            .await?;

        // The counter only moves when a row was actually inserted or
        // deleted by this call. A racing request that lost the conflict
        // (or the delete) must not bump it again.
        let (upvoted, changed) = match existing {
            Some(row) => {
                let result = Upvote::delete_by_id(row.id).exec(&txn).await?;
                (false, result.rows_affected == 1)
            }
            None => {
                // The unique index makes a double-submit a no-op.
                let result = txn
                    .execute(Statement::from_sql_and_values(
                        sea_orm::DatabaseBackend::Postgres,
                        "INSERT INTO upvotes (user_id, report_id, created_at)
                         VALUES ($1, $2, NOW())
                         ON CONFLICT (user_id, report_id) DO NOTHING",
                        vec![user_id.into(), report_id.into()],
                    ))
                    .await?;
                (true, result.rows_affected() == 1)
            }
        };

        if changed {
            let delta: i32 = if upvoted { 1 } else { -1 };
            txn.execute(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                "UPDATE reports
                 SET upvote_count = GREATEST(upvote_count + $1, 0),
                     updated_at = NOW()
                 WHERE id = $2",
                vec![delta.into(), report_id.into()],
            ))
            .await?;
        }

        let upvote_count = Report::find_by_id(report_id)
            .one(&txn)
            .await?
            .map(|r| r.upvote_count)
            .unwrap_or(0);

        txn.commit().await?;

        Ok(UpvoteChange {
            upvoted,
            changed,
            upvote_count,
            author_user_id,
        })
    }

    /// Report ids the user has upvoted, for marking the feed.
    pub async fn upvoted_report_ids(&self, user_id: i32) -> AppResult<Vec<i32>> {
        let rows = Upvote::find()
            .filter(upvote::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|r| r.report_id).collect())
    }
}
