//! Business logic services.

pub mod access;
pub mod analytics;
pub mod audit;
pub mod notifier;
pub mod report;
pub mod user;

pub use access::{Denial, allowed_types, can_access_type, dominates, rank};
pub use analytics::AnalyticsService;
pub use audit::{AuditEntry, AuditService};
pub use notifier::{Notifier, NullNotifier, WebhookNotifier};
pub use report::ReportService;
pub use user::UserService;
