//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250201_000001_create_user_table;
mod m20250201_000002_create_report_table;
mod m20250201_000003_create_report_attachment_table;
mod m20250201_000004_create_report_status_history_table;
mod m20250201_000005_create_audit_log_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250201_000001_create_user_table::Migration),
            Box::new(m20250201_000002_create_report_table::Migration),
            Box::new(m20250201_000003_create_report_attachment_table::Migration),
            Box::new(m20250201_000004_create_report_status_history_table::Migration),
            Box::new(m20250201_000005_create_audit_log_table::Migration),
        ]
    }
}
