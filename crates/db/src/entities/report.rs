//! Report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Report type. Fixed at creation, never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    #[sea_orm(string_value = "player_report")]
    PlayerReport,
    #[sea_orm(string_value = "bug_report")]
    BugReport,
    #[sea_orm(string_value = "feedback")]
    Feedback,
}

impl ReportType {
    /// Stable wire name, matching the stored column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlayerReport => "player_report",
            Self::BugReport => "bug_report",
            Self::Feedback => "feedback",
        }
    }
}

/// Report priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum Priority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    #[default]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

impl Priority {
    /// Stable wire name, matching the stored column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Report status. Transitions are governed by the lifecycle service in
/// `reportd-core`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ReportStatus {
    /// Stable wire name, matching the stored column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }
}

/// Report model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_name = "type")]
    pub report_type: ReportType,

    /// Free-form classification, validated for length only.
    pub category: String,

    #[sea_orm(nullable)]
    pub subcategory: Option<String>,

    pub priority: Priority,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// In-game id of the player being reported, if any.
    #[sea_orm(nullable)]
    pub target_player_id: Option<String>,

    /// External identity of the reporter. NULL for anonymous reports, which
    /// therefore can never pass the reopen ownership check.
    #[sea_orm(nullable)]
    pub reporter_external_id: Option<String>,

    /// In-game id of the reporter at submission time, if submitted in-game.
    #[sea_orm(nullable)]
    pub reporter_player_id: Option<String>,

    pub anonymous: bool,

    pub status: ReportStatus,

    /// Handling staff member. Non-null whenever status is `in_progress`;
    /// a resolved report may retain its last handler.
    #[sea_orm(nullable)]
    pub handled_by: Option<i32>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::HandledBy",
        to = "super::user::Column::Id"
    )]
    Handler,
    #[sea_orm(has_many = "super::report_attachment::Entity")]
    Attachments,
    #[sea_orm(has_many = "super::report_status_history::Entity")]
    StatusHistory,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Handler.def()
    }
}

impl Related<super::report_attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl Related<super::report_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names_are_stable() {
        assert_eq!(ReportType::PlayerReport.as_str(), "player_report");
        assert_eq!(ReportType::BugReport.as_str(), "bug_report");
        assert_eq!(ReportType::Feedback.as_str(), "feedback");

        assert_eq!(Priority::Low.as_str(), "low");
        assert_eq!(Priority::Medium.as_str(), "medium");
        assert_eq!(Priority::High.as_str(), "high");

        assert_eq!(ReportStatus::Pending.as_str(), "pending");
        assert_eq!(ReportStatus::InProgress.as_str(), "in_progress");
        assert_eq!(ReportStatus::Resolved.as_str(), "resolved");
        assert_eq!(ReportStatus::Rejected.as_str(), "rejected");
    }
}
