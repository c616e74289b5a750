use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum PointsLedger {
    Table,
    Id,
    UserId,
    Delta,
    Reason,
    RefType,
    RefId,
    ActorUserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PointsLedger::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointsLedger::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PointsLedger::UserId).integer().not_null())
                    .col(ColumnDef::new(PointsLedger::Delta).integer().not_null())
                    .col(ColumnDef::new(PointsLedger::Reason).string_len(50).not_null())
                    .col(ColumnDef::new(PointsLedger::RefType).string_len(20).not_null())
                    .col(ColumnDef::new(PointsLedger::RefId).integer().not_null())
                    .col(ColumnDef::new(PointsLedger::ActorUserId).integer().not_null())
                    .col(
                        ColumnDef::new(PointsLedger::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_points_ledger_user_id")
                            .from(PointsLedger::Table, PointsLedger::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_points_ledger_user_id")
                    .table(PointsLedger::Table)
                    .col(PointsLedger::UserId)
                    .to_owned(),
            )
            .await?;

        // Lets a refunding path find the matching grant quickly.
        manager
            .create_index(
                Index::create()
                    .name("idx_points_ledger_ref")
                    .table(PointsLedger::Table)
                    .col(PointsLedger::RefType)
                    .col(PointsLedger::RefId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PointsLedger::Table).to_owned())
            .await
    }
}
