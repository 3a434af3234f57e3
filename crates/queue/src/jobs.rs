//! Maintenance job implementations backed by the core services.

use std::sync::Arc;

use reportd_core::{AnalyticsService, AuditService, ReportService};

use crate::scheduler::JobExecutor;

/// Executor wiring the scheduled jobs to the core services.
pub struct MaintenanceExecutor {
    report_service: ReportService,
    analytics_service: AnalyticsService,
    audit_service: AuditService,
}

impl MaintenanceExecutor {
    /// Create a new maintenance executor.
    #[must_use]
    pub const fn new(
        report_service: ReportService,
        analytics_service: AnalyticsService,
        audit_service: AuditService,
    ) -> Self {
        Self {
            report_service,
            analytics_service,
            audit_service,
        }
    }

    /// Wrap into the `Arc` the scheduler expects.
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl JobExecutor for MaintenanceExecutor {
    async fn assign_sweep(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.report_service.sweep_unassigned().await?)
    }

    async fn stale_check(
        &self,
        threshold_hours: i64,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.report_service.escalate_stale(threshold_hours).await?)
    }

    async fn digest(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let stats = self.analytics_service.dashboard().await?;
        tracing::info!(
            total = stats.total,
            pending = stats.by_status.pending,
            in_progress = stats.by_status.in_progress,
            resolved = stats.by_status.resolved,
            rejected = stats.by_status.rejected,
            last_24h = stats.last_24h,
            "Report queue digest"
        );
        Ok(())
    }

    async fn purge_audit_logs(
        &self,
        retention_days: i64,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.audit_service.purge(retention_days).await?)
    }
}
