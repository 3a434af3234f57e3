//! Create report table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Report::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Report::Type).string_len(32).not_null())
                    .col(ColumnDef::new(Report::Category).string_len(50).not_null())
                    .col(ColumnDef::new(Report::Subcategory).string_len(50))
                    .col(
                        ColumnDef::new(Report::Priority)
                            .string_len(16)
                            .not_null()
                            .default("medium"),
                    )
                    .col(ColumnDef::new(Report::Description).text().not_null())
                    .col(ColumnDef::new(Report::TargetPlayerId).string_len(64))
                    .col(ColumnDef::new(Report::ReporterExternalId).string_len(64))
                    .col(ColumnDef::new(Report::ReporterPlayerId).string_len(64))
                    .col(
                        ColumnDef::new(Report::Anonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Report::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Report::HandledBy).integer())
                    .col(
                        ColumnDef::new(Report::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Report::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_handled_by")
                            .from(Report::Table, Report::HandledBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: status (the most common filter)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_status")
                    .table(Report::Table)
                    .col(Report::Status)
                    .to_owned(),
            )
            .await?;

        // Index: type
        manager
            .create_index(
                Index::create()
                    .name("idx_report_type")
                    .table(Report::Table)
                    .col(Report::Type)
                    .to_owned(),
            )
            .await?;

        // Index: handled_by (workload counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_handled_by")
                    .table(Report::Table)
                    .col(Report::HandledBy)
                    .to_owned(),
            )
            .await?;

        // Index: reporter_external_id ("my reports" listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_reporter_external_id")
                    .table(Report::Table)
                    .col(Report::ReporterExternalId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at
        manager
            .create_index(
                Index::create()
                    .name("idx_report_created_at")
                    .table(Report::Table)
                    .col(Report::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Report::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
    Type,
    Category,
    Subcategory,
    Priority,
    Description,
    TargetPlayerId,
    ReporterExternalId,
    ReporterPlayerId,
    Anonymous,
    Status,
    HandledBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
