//! Audit log entity.
//!
//! Write-only from the application's perspective: rows are appended for
//! every permitted state-changing action and only removed by the retention
//! purge job.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit log model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Action name, e.g. `report.status_update` or `user.role_change`.
    pub action: String,

    #[sea_orm(nullable)]
    pub user_id: Option<i32>,

    #[sea_orm(nullable)]
    pub user_external_id: Option<String>,

    #[sea_orm(nullable)]
    pub user_role: Option<String>,

    #[sea_orm(nullable)]
    pub ip_address: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,

    /// Method and path of the originating request.
    #[sea_orm(nullable)]
    pub endpoint: Option<String>,

    #[sea_orm(nullable)]
    pub report_id: Option<i64>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
