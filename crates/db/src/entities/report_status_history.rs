//! Report status history entity.
//!
//! Append-only: rows are inserted on every status transition and never
//! updated or deleted by application logic (they cascade with the report).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::report::ReportStatus;

/// Status history model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report_status_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub report_id: i64,

    pub old_status: ReportStatus,

    pub new_status: ReportStatus,

    /// Staff member who made the change. NULL when the user was deleted, or
    /// for reporter-initiated reopens of web-submitted reports.
    #[sea_orm(nullable)]
    pub changed_by: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    pub changed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::report::Entity",
        from = "Column::ReportId",
        to = "super::report::Column::Id"
    )]
    Report,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ChangedBy",
        to = "super::user::Column::Id"
    )]
    ChangedBy,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChangedBy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
