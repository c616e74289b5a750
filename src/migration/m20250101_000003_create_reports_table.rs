use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Reports {
    Table,
    Id,
    UserId,
    CategoryId,
    IsAnonymous,
    Location,
    Latitude,
    Longitude,
    PhotoUrl,
    AfterPhotoUrl,
    Description,
    Tags,
    UpvoteCount,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reports::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reports::UserId).integer().not_null())
                    .col(ColumnDef::new(Reports::CategoryId).integer().not_null())
                    .col(
                        ColumnDef::new(Reports::IsAnonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Reports::Location).string_len(255).not_null())
                    .col(ColumnDef::new(Reports::Latitude).double())
                    .col(ColumnDef::new(Reports::Longitude).double())
                    .col(ColumnDef::new(Reports::PhotoUrl).string_len(500).not_null())
                    .col(ColumnDef::new(Reports::AfterPhotoUrl).string_len(500))
                    .col(ColumnDef::new(Reports::Description).text().not_null())
                    .col(
                        ColumnDef::new(Reports::Tags)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'::json")),
                    )
                    .col(
                        ColumnDef::new(Reports::UpvoteCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Reports::Status)
                            .string_len(20)
                            .not_null()
                            .default("reported"),
                    )
                    .col(
                        ColumnDef::new(Reports::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Reports::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reports_user_id")
                            .from(Reports::Table, Reports::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reports_category_id")
                            .from(Reports::Table, Reports::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reports_user_id")
                    .table(Reports::Table)
                    .col(Reports::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reports_category_id")
                    .table(Reports::Table)
                    .col(Reports::CategoryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reports::Table).to_owned())
            .await
    }
}
