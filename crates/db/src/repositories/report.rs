//! Report repository for reports, attachments, and status history.

use std::sync::Arc;

use crate::entities::{
    Report, ReportAttachment, ReportStatusHistory,
    report::{self, Priority, ReportStatus, ReportType},
    report_attachment, report_status_history,
};
use chrono::{DateTime, Utc};
use reportd_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Filters for report listings.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub report_type: Option<ReportType>,
    pub status: Option<ReportStatus>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub handled_by: Option<i32>,
    pub reporter_external_id: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    /// Substring match over description, category, and target player id.
    pub search: Option<String>,
    /// Role-visibility restriction computed by the caller from the actor's
    /// role. None means unrestricted (admin/owner).
    pub visible_types: Option<Vec<ReportType>>,
}

impl ReportFilter {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all();

        if let Some(ty) = self.report_type {
            cond = cond.add(report::Column::ReportType.eq(ty));
        }
        if let Some(status) = self.status {
            cond = cond.add(report::Column::Status.eq(status));
        }
        if let Some(priority) = self.priority {
            cond = cond.add(report::Column::Priority.eq(priority));
        }
        if let Some(category) = &self.category {
            cond = cond.add(report::Column::Category.eq(category.clone()));
        }
        if let Some(handler) = self.handled_by {
            cond = cond.add(report::Column::HandledBy.eq(handler));
        }
        if let Some(reporter) = &self.reporter_external_id {
            cond = cond.add(report::Column::ReporterExternalId.eq(reporter.clone()));
        }
        if let Some(from) = self.created_from {
            cond = cond.add(report::Column::CreatedAt.gte(from));
        }
        if let Some(to) = self.created_to {
            cond = cond.add(report::Column::CreatedAt.lte(to));
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{search}%");
            cond = cond.add(
                Condition::any()
                    .add(report::Column::Description.like(pattern.clone()))
                    .add(report::Column::Category.like(pattern.clone()))
                    .add(report::Column::TargetPlayerId.like(pattern)),
            );
        }
        if let Some(types) = &self.visible_types {
            cond = cond.add(report::Column::ReportType.is_in(types.iter().copied()));
        }

        cond
    }
}

/// One page of a report listing.
#[derive(Debug, Clone)]
pub struct ReportPage {
    pub reports: Vec<report::Model>,
    pub total: u64,
}

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ========== Reports ==========

    /// Insert a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a report by id.
    pub async fn get(&self, id: i64) -> AppResult<report::Model> {
        Report::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or(AppError::ReportNotFound(id))
    }

    /// List reports matching the filter, newest first.
    pub async fn list(&self, filter: &ReportFilter, limit: u64, offset: u64) -> AppResult<ReportPage> {
        let cond = filter.condition();

        let reports = Report::find()
            .filter(cond.clone())
            .order_by_desc(report::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let total = Report::find()
            .filter(cond)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ReportPage { reports, total })
    }

    /// Update a report.
    pub async fn update(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a report. Attachment and history rows cascade at the schema
    /// level.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = Report::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::ReportNotFound(id));
        }
        Ok(())
    }

    /// Reports with no handler that are not in a terminal status.
    pub async fn unassigned(&self) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(report::Column::HandledBy.is_null())
            .filter(report::Column::Status.ne(ReportStatus::Resolved))
            .filter(report::Column::Status.ne(ReportStatus::Rejected))
            .order_by_asc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pending reports created before the given instant.
    pub async fn stale_pending(&self, before: DateTime<Utc>) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .filter(report::Column::CreatedAt.lt(before))
            .order_by_asc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of reports currently in progress and handled by the given
    /// staff member (their workload).
    pub async fn active_count_for(&self, user_id: i32) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::HandledBy.eq(user_id))
            .filter(report::Column::Status.eq(ReportStatus::InProgress))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reports matching a status.
    pub async fn count_by_status(&self, status: ReportStatus) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reports matching a type.
    pub async fn count_by_type(&self, ty: ReportType) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::ReportType.eq(ty))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reports matching a priority.
    pub async fn count_by_priority(&self, priority: Priority) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::Priority.eq(priority))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reports created since the given instant.
    pub async fn count_created_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::CreatedAt.gte(since))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all reports.
    pub async fn count_all(&self) -> AppResult<u64> {
        Report::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ========== Status history ==========

    /// Append a status history row. History is append-only; there is no
    /// update or delete counterpart.
    pub async fn append_history(
        &self,
        model: report_status_history::ActiveModel,
    ) -> AppResult<report_status_history::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Status history for a report, newest first.
    pub async fn history_for(&self, report_id: i64) -> AppResult<Vec<report_status_history::Model>> {
        ReportStatusHistory::find()
            .filter(report_status_history::Column::ReportId.eq(report_id))
            .order_by_desc(report_status_history::Column::ChangedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ========== Attachments ==========

    /// Insert an attachment row.
    pub async fn add_attachment(
        &self,
        model: report_attachment::ActiveModel,
    ) -> AppResult<report_attachment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an attachment by id, scoped to its report.
    pub async fn get_attachment(
        &self,
        report_id: i64,
        attachment_id: i64,
    ) -> AppResult<report_attachment::Model> {
        ReportAttachment::find_by_id(attachment_id)
            .filter(report_attachment::Column::ReportId.eq(report_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Attachment {attachment_id} not found")))
    }

    /// All attachments for a report.
    pub async fn attachments_for(&self, report_id: i64) -> AppResult<Vec<report_attachment::Model>> {
        ReportAttachment::find()
            .filter(report_attachment::Column::ReportId.eq(report_id))
            .order_by_asc(report_attachment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_report(id: i64, status: ReportStatus) -> report::Model {
        report::Model {
            id,
            report_type: ReportType::BugReport,
            category: "gameplay".to_string(),
            subcategory: None,
            priority: Priority::Medium,
            description: "Test report".to_string(),
            target_player_id: None,
            reporter_external_id: Some("ext-1".to_string()),
            reporter_player_id: None,
            anonymous: false,
            status,
            handled_by: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_report() {
        let report = test_report(1, ReportStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let found = repo.get(1).await.unwrap();
        assert_eq!(found.id, 1);
        assert_eq!(found.status, ReportStatus::Pending);
    }

    #[tokio::test]
    async fn test_get_report_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<report::Model>::new()])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let err = repo.get(42).await.unwrap_err();
        assert!(matches!(err, AppError::ReportNotFound(42)));
    }

    #[tokio::test]
    async fn test_unassigned() {
        let open = test_report(1, ReportStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[open]])
                .into_connection(),
        );

        let repo = ReportRepository::new(db);
        let unassigned = repo.unassigned().await.unwrap();
        assert_eq!(unassigned.len(), 1);
        assert!(unassigned[0].handled_by.is_none());
    }

    #[test]
    fn test_filter_condition_composes() {
        let filter = ReportFilter {
            status: Some(ReportStatus::Pending),
            visible_types: Some(vec![ReportType::BugReport, ReportType::Feedback]),
            search: Some("crash".to_string()),
            ..ReportFilter::default()
        };
        let cond = filter.condition();
        let debug = format!("{cond:?}");
        assert!(debug.contains("pending"));
        assert!(debug.contains("bug_report"));
    }
}
