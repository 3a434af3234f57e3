//! Scheduled jobs for periodic maintenance tasks.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use reportd_common::config::JobsConfig;
use tokio::time::interval;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval for the assignment sweep (default: 30 minutes).
    pub assign_sweep_interval: Duration,
    /// Interval for the staleness check (default: 1 hour).
    pub stale_check_interval: Duration,
    /// Age in hours after which a pending report is stale.
    pub stale_threshold_hours: i64,
    /// Interval for the digest (default: daily).
    pub digest_interval: Duration,
    /// Interval for the audit retention purge (default: daily).
    pub retention_interval: Duration,
    /// Days to retain audit records.
    pub audit_retention_days: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from_jobs_config(&JobsConfig::default())
    }
}

impl SchedulerConfig {
    /// Build from the application's job configuration.
    #[must_use]
    pub const fn from_jobs_config(jobs: &JobsConfig) -> Self {
        Self {
            assign_sweep_interval: Duration::from_secs(jobs.assign_sweep_secs),
            stale_check_interval: Duration::from_secs(jobs.stale_check_secs),
            stale_threshold_hours: jobs.stale_threshold_hours,
            digest_interval: Duration::from_secs(jobs.digest_secs),
            retention_interval: Duration::from_secs(jobs.retention_secs),
            audit_retention_days: jobs.audit_retention_days,
        }
    }
}

/// Job executor trait for scheduled jobs.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Route unassigned open reports to eligible staff. Returns the number
    /// of reports assigned.
    async fn assign_sweep(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;

    /// Flag pending reports older than the threshold. Returns the number
    /// of stale reports found.
    async fn stale_check(
        &self,
        threshold_hours: i64,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;

    /// Produce the periodic queue digest.
    async fn digest(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Purge audit records past the retention window. Returns the number
    /// of records removed.
    async fn purge_audit_logs(
        &self,
        retention_days: i64,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Run the scheduler with the given configuration and executor.
pub async fn run_scheduler<E: JobExecutor + 'static>(config: SchedulerConfig, executor: Arc<E>) {
    let executor_sweep = executor.clone();
    let executor_stale = executor.clone();
    let executor_digest = executor.clone();
    let executor_retention = executor;

    let sweep_interval = config.assign_sweep_interval;
    let stale_interval = config.stale_check_interval;
    let stale_threshold_hours = config.stale_threshold_hours;
    let digest_interval = config.digest_interval;
    let retention_interval = config.retention_interval;
    let audit_retention_days = config.audit_retention_days;

    // Spawn assignment sweep task
    tokio::spawn(async move {
        let mut interval = interval(sweep_interval);
        loop {
            interval.tick().await;
            match executor_sweep.assign_sweep().await {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(count, "Assigned unhandled reports");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Assignment sweep failed");
                }
            }
        }
    });

    // Spawn staleness check task
    tokio::spawn(async move {
        let mut interval = interval(stale_interval);
        loop {
            interval.tick().await;
            match executor_stale.stale_check(stale_threshold_hours).await {
                Ok(count) => {
                    if count > 0 {
                        tracing::warn!(
                            count,
                            threshold_hours = stale_threshold_hours,
                            "Stale pending reports found"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Staleness check failed");
                }
            }
        }
    });

    // Spawn digest task
    tokio::spawn(async move {
        let mut interval = interval(digest_interval);
        loop {
            interval.tick().await;
            if let Err(e) = executor_digest.digest().await {
                tracing::error!(error = %e, "Digest generation failed");
            }
        }
    });

    // Spawn audit retention task
    tokio::spawn(async move {
        let mut interval = interval(retention_interval);
        loop {
            interval.tick().await;
            match executor_retention
                .purge_audit_logs(audit_retention_days)
                .await
            {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(
                            count,
                            retention_days = audit_retention_days,
                            "Purged old audit records"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Audit retention purge failed");
                }
            }
        }
    });
}
