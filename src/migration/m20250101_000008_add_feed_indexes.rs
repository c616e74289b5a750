use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // The feed always reads newest-first.
        db.execute_unprepared(
            "CREATE INDEX idx_reports_created_at ON reports (created_at DESC)",
        )
        .await?;

        db.execute_unprepared("CREATE INDEX idx_reports_status ON reports (status)")
            .await?;

        db.execute_unprepared(
            "CREATE INDEX idx_reports_upvote_count ON reports (upvote_count DESC)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP INDEX IF EXISTS idx_reports_created_at")
            .await?;
        db.execute_unprepared("DROP INDEX IF EXISTS idx_reports_status")
            .await?;
        db.execute_unprepared("DROP INDEX IF EXISTS idx_reports_upvote_count")
            .await?;
        Ok(())
    }
}
