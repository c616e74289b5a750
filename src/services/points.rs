use crate::{
    error::{AppError, AppResult},
    models::{points_ledger, user, PointsLedger, User},
    services::cache::CacheService,
    services::leaderboard::CACHE_PATTERN_LEADERBOARD,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

pub const POINTS_REPORT_SUBMITTED: i32 = 10;
pub const POINTS_UPVOTE_RECEIVED: i32 = 1;
pub const POINTS_REPORT_CLEANED: i32 = 25;

pub struct PointsService {
    db: DatabaseConnection,
    cache: Option<CacheService>,
}

impl PointsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, cache: None }
    }

    pub fn with_cache(mut self, cache: CacheService) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Credit (or debit) points, with a ledger entry for auditability.
    pub async fn grant(
        &self,
        user_id: i32,
        delta: i32,
        reason: &str,
        ref_type: &str,
        ref_id: i32,
        actor_user_id: i32,
    ) -> AppResult<()> {
        if delta == 0 {
            return Ok(());
        }

        let txn = self.db.begin().await?;

        // 1) 记账（可审计/可回滚）
        let ledger = points_ledger::ActiveModel {
            user_id: Set(user_id),
            delta: Set(delta),
            reason: Set(reason.to_string()),
            ref_type: Set(ref_type.to_string()),
            ref_id: Set(ref_id),
            actor_user_id: Set(actor_user_id),
            ..Default::default()
        };
        ledger.insert(&txn).await?;

        // 2) 汇总到 users.points
        let result = User::update_many()
            .col_expr(
                user::Column::Points,
                Expr::col(user::Column::Points).add(delta),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        txn.commit().await?;
        self.invalidate_rankings().await;
        Ok(())
    }

    /// Points for an upvote landing on (or leaving) someone's report.
    /// Upvoting your own report earns nothing.
    pub async fn apply_upvote_points(
        &self,
        actor_user_id: i32,
        author_user_id: i32,
        report_id: i32,
        delta: i32,
    ) -> AppResult<()> {
        if author_user_id == actor_user_id {
            return Ok(());
        }
        self.grant(
            author_user_id,
            delta,
            "upvote_received",
            "report",
            report_id,
            actor_user_id,
        )
        .await
    }

    /// 将指定引用（ref_type/ref_id）产生的积分全部回滚（用于删除报告等场景）。
    pub async fn rollback_by_ref(&self, ref_type: &str, ref_id: i32) -> AppResult<i64> {
        let txn = self.db.begin().await?;

        let entries = PointsLedger::find()
            .filter(points_ledger::Column::RefType.eq(ref_type))
            .filter(points_ledger::Column::RefId.eq(ref_id))
            .all(&txn)
            .await?;

        for e in &entries {
            User::update_many()
                .col_expr(
                    user::Column::Points,
                    Expr::col(user::Column::Points).sub(e.delta),
                )
                .filter(user::Column::Id.eq(e.user_id))
                .exec(&txn)
                .await?;
        }

        PointsLedger::delete_many()
            .filter(points_ledger::Column::RefType.eq(ref_type))
            .filter(points_ledger::Column::RefId.eq(ref_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        if !entries.is_empty() {
            self.invalidate_rankings().await;
        }
        Ok(entries.len() as i64)
    }

    async fn invalidate_rankings(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_pattern(CACHE_PATTERN_LEADERBOARD).await;
        }
    }
}
