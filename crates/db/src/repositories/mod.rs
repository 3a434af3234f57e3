//! Database repositories.

mod audit;
mod report;
mod user;

pub use audit::AuditLogRepository;
pub use report::{ReportFilter, ReportPage, ReportRepository};
pub use user::UserRepository;
