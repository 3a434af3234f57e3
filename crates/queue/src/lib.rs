//! Background jobs for reportd.
//!
//! Periodic maintenance over the report queue:
//!
//! - **Assignment sweep**: route unassigned open reports to staff
//! - **Staleness check**: flag pending reports past the age threshold
//! - **Digest**: daily queue summary for the logs
//! - **Retention**: purge audit records past the retention window

pub mod jobs;
pub mod scheduler;

pub use jobs::MaintenanceExecutor;
pub use scheduler::{JobExecutor, SchedulerConfig, run_scheduler};
