//! Audit trail service.

use reportd_common::AppResult;
use reportd_db::{entities::audit_log, repositories::AuditLogRepository};
use sea_orm::Set;

/// One audit trail entry, captured at the request boundary.
#[derive(Debug, Clone, Default)]
pub struct AuditEntry {
    pub action: String,
    pub user_id: Option<i32>,
    pub user_external_id: Option<String>,
    pub user_role: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub endpoint: Option<String>,
    pub report_id: Option<i64>,
}

impl AuditEntry {
    /// Start an entry for the given action name.
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }
}

/// Service recording permitted state-changing actions.
#[derive(Clone)]
pub struct AuditService {
    audit_repo: AuditLogRepository,
}

impl AuditService {
    /// Create a new audit service.
    #[must_use]
    pub const fn new(audit_repo: AuditLogRepository) -> Self {
        Self { audit_repo }
    }

    /// Record an audit entry.
    ///
    /// Best effort: a failed write is logged and swallowed so the action
    /// that triggered it still succeeds.
    pub async fn record(&self, entry: AuditEntry) {
        let model = audit_log::ActiveModel {
            action: Set(entry.action.clone()),
            user_id: Set(entry.user_id),
            user_external_id: Set(entry.user_external_id),
            user_role: Set(entry.user_role),
            ip_address: Set(entry.ip_address),
            user_agent: Set(entry.user_agent),
            endpoint: Set(entry.endpoint),
            report_id: Set(entry.report_id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        if let Err(e) = self.audit_repo.append(model).await {
            tracing::warn!(action = %entry.action, error = %e, "Failed to record audit entry");
        }
    }

    /// Recent entries, newest first.
    pub async fn recent(&self, limit: u64) -> AppResult<Vec<audit_log::Model>> {
        self.audit_repo.recent(limit).await
    }

    /// Remove entries older than the retention window. Returns the number
    /// of rows removed.
    pub async fn purge(&self, retention_days: i64) -> AppResult<u64> {
        let before = chrono::Utc::now() - chrono::Duration::days(retention_days);
        self.audit_repo.purge_older_than(before).await
    }
}
