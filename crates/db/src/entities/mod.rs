//! Database entities.

pub mod audit_log;
pub mod report;
pub mod report_attachment;
pub mod report_status_history;
pub mod user;

pub use audit_log::Entity as AuditLog;
pub use report::Entity as Report;
pub use report_attachment::Entity as ReportAttachment;
pub use report_status_history::Entity as ReportStatusHistory;
pub use user::Entity as User;
