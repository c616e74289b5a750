use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Upvotes {
    Table,
    Id,
    UserId,
    ReportId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Reports {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Upvotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Upvotes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Upvotes::UserId).integer().not_null())
                    .col(ColumnDef::new(Upvotes::ReportId).integer().not_null())
                    .col(
                        ColumnDef::new(Upvotes::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_upvotes_user_id")
                            .from(Upvotes::Table, Upvotes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_upvotes_report_id")
                            .from(Upvotes::Table, Upvotes::ReportId)
                            .to(Reports::Table, Reports::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One upvote per user per report. The toggle path relies on this.
        manager
            .create_index(
                Index::create()
                    .name("idx_upvotes_user_report")
                    .table(Upvotes::Table)
                    .col(Upvotes::UserId)
                    .col(Upvotes::ReportId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_upvotes_report_id")
                    .table(Upvotes::Table)
                    .col(Upvotes::ReportId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Upvotes::Table).to_owned())
            .await
    }
}
