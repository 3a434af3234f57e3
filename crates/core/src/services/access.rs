//! Role policy and access guards.
//!
//! Every permission decision in the system goes through this module: role
//! ranking, per-role report-type visibility, and the guards the report
//! service and API layer consult before touching a report.

use reportd_common::AppError;
use reportd_db::entities::{
    report::{self, ReportType},
    user::{self, Role},
};

/// Numeric rank of a role. Higher ranks hold every permission of the ranks
/// below them.
#[must_use]
pub const fn rank(role: Role) -> u8 {
    match role {
        Role::Support => 1,
        Role::Moderator => 2,
        Role::Admin => 3,
        Role::Owner => 4,
    }
}

/// Whether role `a` holds at least the authority of role `b`.
#[must_use]
pub const fn dominates(a: Role, b: Role) -> bool {
    rank(a) >= rank(b)
}

/// Report types a role may see and work on.
///
/// Support staff are restricted to bug reports and feedback; player reports
/// carry personal context and require moderator rank or above.
#[must_use]
pub const fn allowed_types(role: Role) -> &'static [ReportType] {
    match role {
        Role::Support => &[ReportType::BugReport, ReportType::Feedback],
        Role::Moderator | Role::Admin | Role::Owner => &[
            ReportType::PlayerReport,
            ReportType::BugReport,
            ReportType::Feedback,
        ],
    }
}

/// Whether a role may access reports of the given type.
#[must_use]
pub fn can_access_type(role: Role, ty: ReportType) -> bool {
    allowed_types(role).contains(&ty)
}

/// A guard denial with a stable reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No authenticated actor.
    Unauthenticated,
    /// The actor's role may not access this report type.
    ForbiddenType,
    /// The report is assigned to another staff member.
    ForbiddenAssignedToOther,
    /// The report does not exist as far as this actor is concerned.
    NotFound,
}

impl Denial {
    /// Stable reason code, safe to expose to clients.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::ForbiddenType => "FORBIDDEN_TYPE",
            Self::ForbiddenAssignedToOther => "FORBIDDEN_ASSIGNED_TO_OTHER",
            Self::NotFound => "NOT_FOUND",
        }
    }
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => Self::Unauthorized,
            Denial::ForbiddenType | Denial::ForbiddenAssignedToOther => {
                Self::Forbidden(denial.code().to_string())
            }
            Denial::NotFound => Self::NotFound("Report not found".to_string()),
        }
    }
}

/// Whether the actor may read the report at all.
pub fn can_read(actor: Option<&user::Model>, report: &report::Model) -> Result<(), Denial> {
    let actor = actor.ok_or(Denial::Unauthenticated)?;
    if !can_access_type(actor.role, report.report_type) {
        return Err(Denial::ForbiddenType);
    }
    Ok(())
}

/// Whether the actor may change the report (status updates, deletion of
/// attachments, notes).
///
/// Reading access is required first. Below admin rank, a report assigned to
/// someone else is off limits.
pub fn can_modify(actor: Option<&user::Model>, report: &report::Model) -> Result<(), Denial> {
    can_read(actor, report)?;
    let actor = actor.ok_or(Denial::Unauthenticated)?;

    if let Some(handler) = report.handled_by
        && handler != actor.id
        && !dominates(actor.role, Role::Admin)
    {
        return Err(Denial::ForbiddenAssignedToOther);
    }
    Ok(())
}

/// Whether the actor may assign the report to the given staff member.
///
/// Both the actor and the assignee must be able to access the report's
/// type. Assigning over an existing handler follows the same rule as
/// modification.
pub fn can_assign(
    actor: Option<&user::Model>,
    assignee: &user::Model,
    report: &report::Model,
) -> Result<(), Denial> {
    can_modify(actor, report)?;
    if !can_access_type(assignee.role, report.report_type) {
        return Err(Denial::ForbiddenType);
    }
    Ok(())
}

/// Whether the holder of `identity` (an external platform id) may reopen
/// the report.
///
/// Only the original reporter may reopen, and anonymous reports can never
/// be reopened: without a recorded reporter identity there is nobody to
/// verify. Mismatches answer with `NotFound` so the guard does not leak
/// report existence to strangers.
pub fn can_reopen(identity: Option<&str>, report: &report::Model) -> Result<(), Denial> {
    let external_id = identity.ok_or(Denial::Unauthenticated)?;
    if report.anonymous {
        return Err(Denial::NotFound);
    }
    match report.reporter_external_id.as_deref() {
        Some(reporter) if reporter == external_id => Ok(()),
        _ => Err(Denial::NotFound),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reportd_db::entities::report::{Priority, ReportStatus};

    fn staff(id: i32, role: Role) -> user::Model {
        user::Model {
            id,
            external_id: format!("ext-{id}"),
            username: format!("user{id}"),
            avatar_url: None,
            email: None,
            role,
            token: None,
            last_login_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn sample_report(ty: ReportType, handled_by: Option<i32>) -> report::Model {
        report::Model {
            id: 1,
            report_type: ty,
            category: "general".to_string(),
            subcategory: None,
            priority: Priority::Medium,
            description: "description".to_string(),
            target_player_id: None,
            reporter_external_id: Some("ext-100".to_string()),
            reporter_player_id: None,
            anonymous: false,
            status: ReportStatus::Pending,
            handled_by,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_rank_is_strictly_increasing() {
        assert!(rank(Role::Support) < rank(Role::Moderator));
        assert!(rank(Role::Moderator) < rank(Role::Admin));
        assert!(rank(Role::Admin) < rank(Role::Owner));
    }

    #[test]
    fn test_dominates_is_reflexive() {
        for role in [Role::Support, Role::Moderator, Role::Admin, Role::Owner] {
            assert!(dominates(role, role));
        }
        assert!(dominates(Role::Owner, Role::Support));
        assert!(!dominates(Role::Support, Role::Moderator));
    }

    #[test]
    fn test_support_cannot_access_player_reports() {
        assert!(!can_access_type(Role::Support, ReportType::PlayerReport));
        assert!(can_access_type(Role::Support, ReportType::BugReport));
        assert!(can_access_type(Role::Support, ReportType::Feedback));
    }

    #[test]
    fn test_moderator_and_above_access_all_types() {
        for role in [Role::Moderator, Role::Admin, Role::Owner] {
            for ty in [
                ReportType::PlayerReport,
                ReportType::BugReport,
                ReportType::Feedback,
            ] {
                assert!(can_access_type(role, ty), "{role:?} should access {ty:?}");
            }
        }
    }

    #[test]
    fn test_can_read_requires_authentication() {
        let report = sample_report(ReportType::BugReport, None);
        assert_eq!(can_read(None, &report), Err(Denial::Unauthenticated));
    }

    #[test]
    fn test_can_read_denies_type() {
        let support = staff(1, Role::Support);
        let report = sample_report(ReportType::PlayerReport, None);
        assert_eq!(
            can_read(Some(&support), &report),
            Err(Denial::ForbiddenType)
        );
    }

    #[test]
    fn test_can_modify_denies_assigned_to_other() {
        let moderator = staff(1, Role::Moderator);
        let report = sample_report(ReportType::BugReport, Some(2));
        assert_eq!(
            can_modify(Some(&moderator), &report),
            Err(Denial::ForbiddenAssignedToOther)
        );
    }

    #[test]
    fn test_can_modify_allows_own_assignment() {
        let moderator = staff(2, Role::Moderator);
        let report = sample_report(ReportType::BugReport, Some(2));
        assert!(can_modify(Some(&moderator), &report).is_ok());
    }

    #[test]
    fn test_admin_overrides_assignment() {
        let admin = staff(3, Role::Admin);
        let report = sample_report(ReportType::BugReport, Some(2));
        assert!(can_modify(Some(&admin), &report).is_ok());
    }

    #[test]
    fn test_can_assign_checks_assignee_type() {
        let admin = staff(3, Role::Admin);
        let support = staff(4, Role::Support);
        let report = sample_report(ReportType::PlayerReport, None);
        assert_eq!(
            can_assign(Some(&admin), &support, &report),
            Err(Denial::ForbiddenType)
        );
    }

    #[test]
    fn test_can_reopen_only_by_reporter() {
        let report = sample_report(ReportType::BugReport, None);
        assert!(can_reopen(Some("ext-100"), &report).is_ok());
        assert_eq!(can_reopen(Some("ext-999"), &report), Err(Denial::NotFound));
        assert_eq!(can_reopen(None, &report), Err(Denial::Unauthenticated));
    }

    #[test]
    fn test_can_reopen_never_anonymous() {
        let mut report = sample_report(ReportType::BugReport, None);
        report.anonymous = true;
        assert_eq!(can_reopen(Some("ext-100"), &report), Err(Denial::NotFound));
    }

    #[test]
    fn test_denial_codes_are_stable() {
        assert_eq!(Denial::Unauthenticated.code(), "UNAUTHENTICATED");
        assert_eq!(Denial::ForbiddenType.code(), "FORBIDDEN_TYPE");
        assert_eq!(
            Denial::ForbiddenAssignedToOther.code(),
            "FORBIDDEN_ASSIGNED_TO_OTHER"
        );
        assert_eq!(Denial::NotFound.code(), "NOT_FOUND");
    }
}
