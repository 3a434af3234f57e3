//! Report lifecycle service.
//!
//! Owns the status machine, assignment balancing, and the attachment and
//! history surfaces. All access decisions are delegated to the guards in
//! [`crate::services::access`].

use std::sync::Arc;

use reportd_common::{AppError, AppResult};
use reportd_db::{
    entities::{
        report::{self, Priority, ReportStatus, ReportType},
        report_attachment, report_status_history,
        user::{self, Role},
    },
    repositories::{ReportFilter, ReportPage, ReportRepository, UserRepository},
};
use sea_orm::Set;

use super::{access, notifier::Notifier};

/// Minimum length of a reopen reason, after trimming.
const REOPEN_REASON_MIN_LEN: usize = 10;

/// Maximum length of a report description.
const DESCRIPTION_MAX_LEN: usize = 5000;

/// Maximum length of a category or subcategory label.
const CATEGORY_MAX_LEN: usize = 50;

/// Input for creating a report.
#[derive(Debug, Clone)]
pub struct CreateReportInput {
    pub report_type: ReportType,
    pub category: String,
    pub subcategory: Option<String>,
    pub priority: Priority,
    pub description: String,
    pub target_player_id: Option<String>,
    pub reporter_external_id: Option<String>,
    pub reporter_player_id: Option<String>,
    pub anonymous: bool,
}

/// Input for recording an attachment.
#[derive(Debug, Clone)]
pub struct AttachmentInput {
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
}

/// Pick the assignee with the fewest in-progress reports. Ties go to the
/// higher-ranked candidate; remaining ties keep first-come order.
#[must_use]
pub fn pick_least_loaded(candidates: &[(user::Model, u64)]) -> Option<&user::Model> {
    candidates
        .iter()
        .min_by(|(a, load_a), (b, load_b)| {
            load_a
                .cmp(load_b)
                .then_with(|| access::rank(b.role).cmp(&access::rank(a.role)))
        })
        .map(|(user, _)| user)
}

/// Report lifecycle service.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    user_repo: UserRepository,
    notifier: Arc<dyn Notifier>,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub fn new(
        report_repo: ReportRepository,
        user_repo: UserRepository,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            report_repo,
            user_repo,
            notifier,
        }
    }

    // ========== Creation ==========

    /// Create a new report.
    ///
    /// Submission is open to unauthenticated reporters; anonymous reports
    /// carry no reporter identity at all. Auto-assignment and the creation
    /// notification are best effort.
    pub async fn create_report(&self, input: CreateReportInput) -> AppResult<report::Model> {
        let description = input.description.trim();
        if description.is_empty() {
            return Err(AppError::Validation("Description is required".to_string()));
        }
        if description.len() > DESCRIPTION_MAX_LEN {
            return Err(AppError::Validation("Description too long".to_string()));
        }

        let category = input.category.trim();
        if category.is_empty() || category.len() > CATEGORY_MAX_LEN {
            return Err(AppError::Validation(format!(
                "Category must be between 1 and {CATEGORY_MAX_LEN} characters"
            )));
        }
        if let Some(sub) = &input.subcategory
            && sub.len() > CATEGORY_MAX_LEN
        {
            return Err(AppError::Validation("Subcategory too long".to_string()));
        }

        if input.report_type == ReportType::PlayerReport && input.target_player_id.is_none() {
            return Err(AppError::Validation(
                "Player reports require a target player".to_string(),
            ));
        }

        // An anonymous report must not retain any reporter identity.
        let (reporter_external_id, reporter_player_id) = if input.anonymous {
            (None, None)
        } else {
            (input.reporter_external_id, input.reporter_player_id)
        };

        let model = report::ActiveModel {
            report_type: Set(input.report_type),
            category: Set(category.to_string()),
            subcategory: Set(input.subcategory),
            priority: Set(input.priority),
            description: Set(description.to_string()),
            target_player_id: Set(input.target_player_id),
            reporter_external_id: Set(reporter_external_id),
            reporter_player_id: Set(reporter_player_id),
            anonymous: Set(input.anonymous),
            status: Set(ReportStatus::Pending),
            handled_by: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let mut created = self.report_repo.create(model).await?;

        // Best effort: a full queue or notifier outage must not fail the
        // submission.
        match self.auto_assign(&created).await {
            Ok(Some(assigned)) => created = assigned,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(report_id = created.id, error = %e, "Auto-assignment failed");
            }
        }

        if let Err(e) = self.notifier.report_created(&created).await {
            tracing::warn!(report_id = created.id, error = %e, "Creation notification failed");
        }

        Ok(created)
    }

    // ========== Reading ==========

    /// Get a report, enforcing read access.
    pub async fn get_report(&self, actor: Option<&user::Model>, id: i64) -> AppResult<report::Model> {
        let report = self.report_repo.get(id).await?;
        access::can_read(actor, &report)?;
        Ok(report)
    }

    /// List reports visible to the actor.
    pub async fn list_reports(
        &self,
        actor: Option<&user::Model>,
        mut filter: ReportFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<ReportPage> {
        let actor = actor.ok_or(access::Denial::Unauthenticated)?;

        // Restrict listings to the actor's visible types. Admin rank and
        // above see everything.
        if !access::dominates(actor.role, Role::Admin) {
            filter.visible_types = Some(access::allowed_types(actor.role).to_vec());
        }

        self.report_repo.list(&filter, limit, offset).await
    }

    /// List reports submitted under the given reporter identity.
    pub async fn list_for_reporter(
        &self,
        external_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<ReportPage> {
        let filter = ReportFilter {
            reporter_external_id: Some(external_id.to_string()),
            ..ReportFilter::default()
        };
        self.report_repo.list(&filter, limit, offset).await
    }

    /// Status history for a report, enforcing read access.
    pub async fn history(
        &self,
        actor: Option<&user::Model>,
        report_id: i64,
    ) -> AppResult<Vec<report_status_history::Model>> {
        let report = self.report_repo.get(report_id).await?;
        access::can_read(actor, &report)?;
        self.report_repo.history_for(report_id).await
    }

    // ========== Status machine ==========

    /// Move a report to a new status.
    ///
    /// Staff may move a report between any two distinct statuses, including
    /// backwards moves like un-rejecting or re-taking a resolved report.
    /// The actor becomes the handler of record for the report.
    pub async fn update_status(
        &self,
        actor: &user::Model,
        report_id: i64,
        new_status: ReportStatus,
        notes: Option<String>,
    ) -> AppResult<report::Model> {
        let report = self.report_repo.get(report_id).await?;
        access::can_modify(Some(actor), &report)?;

        let old_status = report.status;
        if old_status == new_status {
            return Err(AppError::Conflict(format!(
                "Report is already {}",
                old_status.as_str()
            )));
        }
        let mut model: report::ActiveModel = report.into();
        model.status = Set(new_status);
        // The updater becomes the handler of record.
        model.handled_by = Set(Some(actor.id));
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.report_repo.update(model).await?;

        self.record_history(report_id, old_status, new_status, Some(actor.id), notes)
            .await;

        if let Err(e) = self
            .notifier
            .status_changed(&updated, old_status.as_str())
            .await
        {
            tracing::warn!(report_id, error = %e, "Status notification failed");
        }

        Ok(updated)
    }

    /// Assign a report to a staff member. Moderator rank and above only.
    pub async fn assign(
        &self,
        actor: &user::Model,
        report_id: i64,
        assignee_id: i32,
    ) -> AppResult<report::Model> {
        if !access::dominates(actor.role, Role::Moderator) {
            return Err(AppError::Forbidden("Moderator rank required".to_string()));
        }
        let report = self.report_repo.get(report_id).await?;
        let assignee = self.user_repo.get_by_id(assignee_id).await?;
        access::can_assign(Some(actor), &assignee, &report)?;

        if matches!(report.status, ReportStatus::Resolved | ReportStatus::Rejected) {
            return Err(AppError::Conflict(
                "Cannot assign a closed report".to_string(),
            ));
        }

        let old_status = report.status;
        let new_status = if old_status == ReportStatus::Pending {
            ReportStatus::InProgress
        } else {
            old_status
        };

        let mut model: report::ActiveModel = report.into();
        model.handled_by = Set(Some(assignee.id));
        model.status = Set(new_status);
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.report_repo.update(model).await?;

        self.record_history(
            report_id,
            old_status,
            new_status,
            Some(actor.id),
            Some("Report assigned".to_string()),
        )
        .await;

        Ok(updated)
    }

    /// Reopen a resolved report on behalf of its original reporter.
    ///
    /// The reason is mandatory and becomes part of the status history.
    pub async fn reopen(
        &self,
        identity: Option<&str>,
        report_id: i64,
        reason: &str,
    ) -> AppResult<report::Model> {
        let report = self.report_repo.get(report_id).await?;
        access::can_reopen(identity, &report)?;

        if report.status != ReportStatus::Resolved {
            return Err(AppError::Conflict(
                "Only resolved reports can be reopened".to_string(),
            ));
        }

        let reason = reason.trim();
        if reason.len() < REOPEN_REASON_MIN_LEN {
            return Err(AppError::Validation(format!(
                "Reopen reason must be at least {REOPEN_REASON_MIN_LEN} characters"
            )));
        }

        let old_status = report.status;
        let mut model: report::ActiveModel = report.into();
        model.status = Set(ReportStatus::Pending);
        // Back in the queue: the previous handler no longer holds it.
        model.handled_by = Set(None);
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.report_repo.update(model).await?;

        // Reopens come from the reporter, not a staff account.
        self.record_history(
            report_id,
            old_status,
            ReportStatus::Pending,
            None,
            Some(format!("Report reopened: {reason}")),
        )
        .await;

        if let Err(e) = self
            .notifier
            .status_changed(&updated, old_status.as_str())
            .await
        {
            tracing::warn!(report_id, error = %e, "Status notification failed");
        }

        Ok(updated)
    }

    /// Delete a report. Admin rank and above only.
    pub async fn delete(&self, actor: &user::Model, report_id: i64) -> AppResult<()> {
        if !access::dominates(actor.role, Role::Admin) {
            return Err(AppError::Forbidden("Admin rank required".to_string()));
        }
        let report = self.report_repo.get(report_id).await?;
        access::can_read(Some(actor), &report)?;

        self.report_repo.delete(report_id).await
    }

    // ========== Assignment balancing ==========

    /// Eligible assignees for a report type with their current workloads.
    async fn candidates_for(&self, ty: ReportType) -> AppResult<Vec<(user::Model, u64)>> {
        let eligible_roles: Vec<Role> = [Role::Support, Role::Moderator, Role::Admin, Role::Owner]
            .into_iter()
            .filter(|role| access::can_access_type(*role, ty))
            .collect();

        let staff = self.user_repo.with_roles(&eligible_roles).await?;
        let mut candidates = Vec::new();
        for member in staff {
            let load = self.report_repo.active_count_for(member.id).await?;
            candidates.push((member, load));
        }
        Ok(candidates)
    }

    /// Try to assign a pending report to the least loaded eligible staff
    /// member. Returns the updated report when an assignment happened.
    pub async fn auto_assign(&self, report: &report::Model) -> AppResult<Option<report::Model>> {
        if report.status != ReportStatus::Pending || report.handled_by.is_some() {
            return Ok(None);
        }

        let candidates = self.candidates_for(report.report_type).await?;
        let Some(assignee) = pick_least_loaded(&candidates) else {
            tracing::debug!(report_id = report.id, "No eligible assignee available");
            return Ok(None);
        };
        let assignee_id = assignee.id;

        let mut model: report::ActiveModel = report.clone().into();
        model.handled_by = Set(Some(assignee_id));
        model.status = Set(ReportStatus::InProgress);
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.report_repo.update(model).await?;

        self.record_history(
            report.id,
            ReportStatus::Pending,
            ReportStatus::InProgress,
            None,
            Some("Report assigned".to_string()),
        )
        .await;

        tracing::info!(
            report_id = report.id,
            assignee_id,
            "Report auto-assigned"
        );

        Ok(Some(updated))
    }

    /// Sweep all unassigned open reports through auto-assignment. Returns
    /// the number of reports assigned.
    pub async fn sweep_unassigned(&self) -> AppResult<u64> {
        let unassigned = self.report_repo.unassigned().await?;
        let mut assigned = 0u64;

        for report in unassigned {
            match self.auto_assign(&report).await {
                Ok(Some(_)) => assigned += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(report_id = report.id, error = %e, "Auto-assignment failed");
                }
            }
        }

        Ok(assigned)
    }

    /// Notify about pending reports older than the staleness threshold.
    /// Returns the number of stale reports found.
    pub async fn escalate_stale(&self, threshold_hours: i64) -> AppResult<u64> {
        let before = chrono::Utc::now() - chrono::Duration::hours(threshold_hours);
        let stale = self.report_repo.stale_pending(before).await?;
        let count = stale.len() as u64;

        for report in stale {
            if let Err(e) = self.notifier.report_stale(&report).await {
                tracing::warn!(report_id = report.id, error = %e, "Stale notification failed");
            }
        }

        Ok(count)
    }

    // ========== Attachments ==========

    /// Record an attachment for a report.
    pub async fn add_attachment(
        &self,
        report_id: i64,
        input: AttachmentInput,
    ) -> AppResult<report_attachment::Model> {
        // Verify the report exists before recording the row.
        self.report_repo.get(report_id).await?;

        let model = report_attachment::ActiveModel {
            report_id: Set(report_id),
            filename: Set(input.filename),
            original_name: Set(input.original_name),
            file_path: Set(input.file_path),
            file_size: Set(input.file_size),
            mime_type: Set(input.mime_type),
            uploaded_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        self.report_repo.add_attachment(model).await
    }

    /// Attachments for a report, enforcing read access.
    pub async fn attachments(
        &self,
        actor: Option<&user::Model>,
        report_id: i64,
    ) -> AppResult<Vec<report_attachment::Model>> {
        let report = self.report_repo.get(report_id).await?;
        access::can_read(actor, &report)?;
        self.report_repo.attachments_for(report_id).await
    }

    /// One attachment, enforcing read access.
    pub async fn attachment(
        &self,
        actor: Option<&user::Model>,
        report_id: i64,
        attachment_id: i64,
    ) -> AppResult<report_attachment::Model> {
        let report = self.report_repo.get(report_id).await?;
        access::can_read(actor, &report)?;
        self.report_repo.get_attachment(report_id, attachment_id).await
    }

    // ========== Helpers ==========

    /// Append a history row. Best effort: history must not fail the
    /// transition that already committed.
    async fn record_history(
        &self,
        report_id: i64,
        old_status: ReportStatus,
        new_status: ReportStatus,
        changed_by: Option<i32>,
        notes: Option<String>,
    ) {
        let model = report_status_history::ActiveModel {
            report_id: Set(report_id),
            old_status: Set(old_status),
            new_status: Set(new_status),
            changed_by: Set(changed_by),
            notes: Set(notes),
            changed_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        if let Err(e) = self.report_repo.append_history(model).await {
            tracing::warn!(report_id, error = %e, "Failed to record status history");
        }
    }
}
