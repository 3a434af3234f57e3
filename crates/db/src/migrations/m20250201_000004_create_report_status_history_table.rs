//! Create report status history table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportStatusHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportStatusHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReportStatusHistory::ReportId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReportStatusHistory::OldStatus)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReportStatusHistory::NewStatus)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReportStatusHistory::ChangedBy).integer())
                    .col(ColumnDef::new(ReportStatusHistory::Notes).text())
                    .col(
                        ColumnDef::new(ReportStatusHistory::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_status_history_report")
                            .from(ReportStatusHistory::Table, ReportStatusHistory::ReportId)
                            .to(Report::Table, Report::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_status_history_changed_by")
                            .from(ReportStatusHistory::Table, ReportStatusHistory::ChangedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: report_id (history listing per report)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_status_history_report_id")
                    .table(ReportStatusHistory::Table)
                    .col(ReportStatusHistory::ReportId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReportStatusHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ReportStatusHistory {
    Table,
    Id,
    ReportId,
    OldStatus,
    NewStatus,
    ChangedBy,
    Notes,
    ChangedAt,
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
