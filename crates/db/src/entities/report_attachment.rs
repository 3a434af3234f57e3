//! Report attachment entity.
//!
//! Attachments are owned exclusively by their report and cascade-deleted
//! with it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report attachment model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report_attachment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub report_id: i64,

    /// Stored file name (storage key).
    pub filename: String,

    /// Name the file was uploaded with.
    pub original_name: String,

    /// Path of the written file on the storage backend.
    pub file_path: String,

    pub file_size: i64,

    pub mime_type: String,

    pub uploaded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::report::Entity",
        from = "Column::ReportId",
        to = "super::report::Column::Id"
    )]
    Report,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
