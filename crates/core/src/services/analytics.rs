//! Aggregate statistics over the report queue.

use reportd_common::AppResult;
use reportd_db::{
    entities::report::{Priority, ReportStatus, ReportType},
    repositories::{ReportRepository, UserRepository},
};
use serde::Serialize;

/// Counts per status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub rejected: u64,
}

/// Counts per report type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCounts {
    pub player_report: u64,
    pub bug_report: u64,
    pub feedback: u64,
}

/// Counts per priority.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

/// Staff-facing dashboard statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: u64,
    pub by_status: StatusCounts,
    pub by_type: TypeCounts,
    pub by_priority: PriorityCounts,
    pub last_24h: u64,
    pub staff_count: u64,
}

/// Public statistics, safe to expose without authentication.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicStats {
    pub total: u64,
    pub resolved: u64,
}

/// Analytics service.
#[derive(Clone)]
pub struct AnalyticsService {
    report_repo: ReportRepository,
    user_repo: UserRepository,
}

impl AnalyticsService {
    /// Create a new analytics service.
    #[must_use]
    pub const fn new(report_repo: ReportRepository, user_repo: UserRepository) -> Self {
        Self {
            report_repo,
            user_repo,
        }
    }

    /// Full dashboard statistics.
    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let by_status = StatusCounts {
            pending: self.report_repo.count_by_status(ReportStatus::Pending).await?,
            in_progress: self
                .report_repo
                .count_by_status(ReportStatus::InProgress)
                .await?,
            resolved: self
                .report_repo
                .count_by_status(ReportStatus::Resolved)
                .await?,
            rejected: self
                .report_repo
                .count_by_status(ReportStatus::Rejected)
                .await?,
        };

        let by_type = TypeCounts {
            player_report: self
                .report_repo
                .count_by_type(ReportType::PlayerReport)
                .await?,
            bug_report: self.report_repo.count_by_type(ReportType::BugReport).await?,
            feedback: self.report_repo.count_by_type(ReportType::Feedback).await?,
        };

        let by_priority = PriorityCounts {
            low: self.report_repo.count_by_priority(Priority::Low).await?,
            medium: self.report_repo.count_by_priority(Priority::Medium).await?,
            high: self.report_repo.count_by_priority(Priority::High).await?,
        };

        let since = chrono::Utc::now() - chrono::Duration::hours(24);

        Ok(DashboardStats {
            total: self.report_repo.count_all().await?,
            by_status,
            by_type,
            by_priority,
            last_24h: self.report_repo.count_created_since(since).await?,
            staff_count: self.user_repo.count().await?,
        })
    }

    /// Public statistics.
    pub async fn public_stats(&self) -> AppResult<PublicStats> {
        Ok(PublicStats {
            total: self.report_repo.count_all().await?,
            resolved: self
                .report_repo
                .count_by_status(ReportStatus::Resolved)
                .await?,
        })
    }
}
