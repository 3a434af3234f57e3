//! Report endpoints.
//!
//! Intake and reporter-facing operations authenticate with the shared
//! client key; staff workflow operations use bearer sessions.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use reportd_common::{AppError, AppResult, storage::generate_storage_key};
use reportd_core::{
    AuditEntry,
    report::{AttachmentInput, CreateReportInput},
};
use reportd_db::{
    entities::{
        report::{self, Priority, ReportStatus, ReportType},
        report_attachment, report_status_history, user,
    },
    repositories::ReportFilter,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{AuthUser, Context, MaybeAuthUser, TrustedClient},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Mime types accepted for attachments.
const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "text/plain",
    "application/pdf",
];

// ========== Wire types ==========

/// Report response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub report_type: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub priority: String,
    pub description: String,
    pub target_player_id: Option<String>,
    pub reporter_external_id: Option<String>,
    pub reporter_player_id: Option<String>,
    pub anonymous: bool,
    pub status: String,
    pub handled_by: Option<i32>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<report::Model> for ReportResponse {
    fn from(r: report::Model) -> Self {
        Self {
            id: r.id,
            report_type: r.report_type.as_str().to_string(),
            category: r.category,
            subcategory: r.subcategory,
            priority: r.priority.as_str().to_string(),
            description: r.description,
            target_player_id: r.target_player_id,
            reporter_external_id: r.reporter_external_id,
            reporter_player_id: r.reporter_player_id,
            anonymous: r.anonymous,
            status: r.status.as_str().to_string(),
            handled_by: r.handled_by,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Status history entry response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub id: i64,
    pub old_status: String,
    pub new_status: String,
    pub changed_by: Option<i32>,
    pub notes: Option<String>,
    pub changed_at: String,
}

impl From<report_status_history::Model> for HistoryResponse {
    fn from(h: report_status_history::Model) -> Self {
        Self {
            id: h.id,
            old_status: h.old_status.as_str().to_string(),
            new_status: h.new_status.as_str().to_string(),
            changed_by: h.changed_by,
            notes: h.notes,
            changed_at: h.changed_at.to_rfc3339(),
        }
    }
}

/// Attachment metadata response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub id: i64,
    pub report_id: i64,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_at: String,
}

impl From<report_attachment::Model> for AttachmentResponse {
    fn from(a: report_attachment::Model) -> Self {
        Self {
            id: a.id,
            report_id: a.report_id,
            original_name: a.original_name,
            file_size: a.file_size,
            mime_type: a.mime_type,
            uploaded_at: a.uploaded_at.to_rfc3339(),
        }
    }
}

/// One page of reports.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPageResponse {
    pub reports: Vec<ReportResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Report creation request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    #[serde(rename = "type")]
    pub report_type: ReportType,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(max = 50))]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    pub target_player_id: Option<String>,
    pub reporter_external_id: Option<String>,
    pub reporter_player_id: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

/// Listing filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    #[serde(rename = "type")]
    pub report_type: Option<ReportType>,
    pub status: Option<ReportStatus>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub handled_by: Option<i32>,
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    25
}

/// Reporter-scoped listing request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MineQuery {
    pub external_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Status change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: ReportStatus,
    pub notes: Option<String>,
}

/// Assignment request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub assignee_id: i32,
}

/// Reopen request, made on the reporter's behalf.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReopenRequest {
    pub external_id: String,
    #[validate(length(min = 10))]
    pub reason: String,
}

// ========== Handlers ==========

fn audit_for(action: &str, actor: &user::Model, ctx: crate::middleware::RequestContext) -> AuditEntry {
    AuditEntry {
        user_id: Some(actor.id),
        user_external_id: Some(actor.external_id.clone()),
        user_role: Some(actor.role.as_str().to_string()),
        ip_address: ctx.ip_address,
        user_agent: ctx.user_agent,
        endpoint: ctx.endpoint,
        ..AuditEntry::new(action)
    }
}

/// Submit a new report.
async fn create(
    _client: TrustedClient,
    State(state): State<AppState>,
    Context(ctx): Context,
    Json(req): Json<CreateReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    req.validate()?;
    let reporter_external_id = req.reporter_external_id.clone();

    let created = state
        .report_service
        .create_report(CreateReportInput {
            report_type: req.report_type,
            category: req.category,
            subcategory: req.subcategory,
            priority: req.priority,
            description: req.description,
            target_player_id: req.target_player_id,
            reporter_external_id,
            reporter_player_id: req.reporter_player_id,
            anonymous: req.anonymous,
        })
        .await?;

    state
        .audit_service
        .record(AuditEntry {
            user_external_id: created.reporter_external_id.clone(),
            ip_address: ctx.ip_address,
            user_agent: ctx.user_agent,
            endpoint: ctx.endpoint,
            report_id: Some(created.id),
            ..AuditEntry::new("report.create")
        })
        .await;

    Ok(ApiResponse::ok(created.into()))
}

/// List reports visible to the caller.
async fn list(
    MaybeAuthUser(actor): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> AppResult<ApiResponse<ReportPageResponse>> {
    let filter = ReportFilter {
        report_type: query.report_type,
        status: query.status,
        priority: query.priority,
        category: query.category,
        handled_by: query.handled_by,
        search: query.search,
        ..ReportFilter::default()
    };

    let limit = query.limit.min(100);
    let page = state
        .report_service
        .list_reports(actor.as_ref(), filter, limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(ReportPageResponse {
        reports: page.reports.into_iter().map(Into::into).collect(),
        total: page.total,
        limit,
        offset: query.offset,
    }))
}

/// List reports submitted by one reporter.
async fn mine(
    _client: TrustedClient,
    State(state): State<AppState>,
    Query(query): Query<MineQuery>,
) -> AppResult<ApiResponse<ReportPageResponse>> {
    let limit = query.limit.min(100);
    let page = state
        .report_service
        .list_for_reporter(&query.external_id, limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(ReportPageResponse {
        reports: page.reports.into_iter().map(Into::into).collect(),
        total: page.total,
        limit,
        offset: query.offset,
    }))
}

/// Get one report.
async fn show(
    MaybeAuthUser(actor): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state.report_service.get_report(actor.as_ref(), id).await?;
    Ok(ApiResponse::ok(report.into()))
}

/// Status history of a report.
async fn history(
    MaybeAuthUser(actor): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vec<HistoryResponse>>> {
    let rows = state.report_service.history(actor.as_ref(), id).await?;
    Ok(ApiResponse::ok(rows.into_iter().map(Into::into).collect()))
}

/// Move a report to a new status.
async fn update_status(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Context(ctx): Context,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let updated = state
        .report_service
        .update_status(&actor, id, req.status, req.notes)
        .await?;

    let mut entry = audit_for("report.status_update", &actor, ctx);
    entry.report_id = Some(id);
    state.audit_service.record(entry).await;

    Ok(ApiResponse::ok(updated.into()))
}

/// Assign a report to a staff member.
async fn assign(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Context(ctx): Context,
    Path(id): Path<i64>,
    Json(req): Json<AssignRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let updated = state
        .report_service
        .assign(&actor, id, req.assignee_id)
        .await?;

    let mut entry = audit_for("report.assign", &actor, ctx);
    entry.report_id = Some(id);
    state.audit_service.record(entry).await;

    Ok(ApiResponse::ok(updated.into()))
}

/// Reopen a resolved report on the reporter's behalf.
async fn reopen(
    _client: TrustedClient,
    State(state): State<AppState>,
    Context(ctx): Context,
    Path(id): Path<i64>,
    Json(req): Json<ReopenRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    req.validate()?;
    let updated = state
        .report_service
        .reopen(Some(&req.external_id), id, &req.reason)
        .await?;

    state
        .audit_service
        .record(AuditEntry {
            user_external_id: Some(req.external_id),
            ip_address: ctx.ip_address,
            user_agent: ctx.user_agent,
            endpoint: ctx.endpoint,
            report_id: Some(id),
            ..AuditEntry::new("report.reopen")
        })
        .await;

    Ok(ApiResponse::ok(updated.into()))
}

/// Delete a report.
async fn destroy(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Context(ctx): Context,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let attachments = state
        .report_service
        .attachments(Some(&actor), id)
        .await
        .unwrap_or_default();

    state.report_service.delete(&actor, id).await?;

    // Rows cascade with the report; stored files are cleaned up best effort.
    for attachment in attachments {
        if let Err(e) = state.storage.delete(&attachment.filename).await {
            tracing::warn!(report_id = id, file = %attachment.filename, error = %e, "Failed to remove attachment file");
        }
    }

    let mut entry = audit_for("report.delete", &actor, ctx);
    entry.report_id = Some(id);
    state.audit_service.record(entry).await;

    Ok(ok())
}

/// Upload an attachment.
///
/// Accepted from staff sessions and from trusted clients uploading on a
/// reporter's behalf.
async fn upload_attachment(
    MaybeAuthUser(actor): MaybeAuthUser,
    State(state): State<AppState>,
    Context(ctx): Context,
    Path(id): Path<i64>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<AttachmentResponse>> {
    let trusted = headers
        .get("x-client-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == state.client_api_key);
    if actor.is_none() && !trusted {
        return Err(AppError::Unauthorized);
    }

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
        .ok_or_else(|| AppError::BadRequest("Missing file field".to_string()))?;

    let original_name = field
        .file_name()
        .map(ToString::to_string)
        .ok_or_else(|| AppError::BadRequest("Missing file name".to_string()))?;
    let mime_type = field
        .content_type()
        .map(ToString::to_string)
        .ok_or_else(|| AppError::BadRequest("Missing content type".to_string()))?;

    if !ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
        return Err(AppError::Validation(format!(
            "Unsupported attachment type: {mime_type}"
        )));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

    if data.len() as u64 > state.max_attachment_size {
        return Err(AppError::Validation("Attachment too large".to_string()));
    }

    let key = generate_storage_key(id, &original_name);
    let stored = state.storage.write(&key, &data).await?;

    let attachment = state
        .report_service
        .add_attachment(
            id,
            AttachmentInput {
                filename: stored.key,
                original_name,
                file_path: stored.path,
                file_size: i64::try_from(stored.size).unwrap_or(i64::MAX),
                mime_type,
            },
        )
        .await?;

    state
        .audit_service
        .record(AuditEntry {
            user_id: actor.as_ref().map(|u| u.id),
            user_external_id: actor.as_ref().map(|u| u.external_id.clone()),
            user_role: actor.as_ref().map(|u| u.role.as_str().to_string()),
            ip_address: ctx.ip_address,
            user_agent: ctx.user_agent,
            endpoint: ctx.endpoint,
            report_id: Some(id),
            ..AuditEntry::new("report.attachment_upload")
        })
        .await;

    Ok(ApiResponse::ok(attachment.into()))
}

/// List a report's attachments.
async fn list_attachments(
    MaybeAuthUser(actor): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Vec<AttachmentResponse>>> {
    let rows = state.report_service.attachments(actor.as_ref(), id).await?;
    Ok(ApiResponse::ok(rows.into_iter().map(Into::into).collect()))
}

/// Download one attachment.
async fn download_attachment(
    MaybeAuthUser(actor): MaybeAuthUser,
    State(state): State<AppState>,
    Path((id, attachment_id)): Path<(i64, i64)>,
) -> AppResult<impl IntoResponse> {
    let attachment = state
        .report_service
        .attachment(actor.as_ref(), id, attachment_id)
        .await?;
    let data = state.storage.read(&attachment.filename).await?;

    let disposition = format!("attachment; filename=\"{}\"", attachment.original_name);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, attachment.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    ))
}

/// Create the reports router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/", get(list))
        .route("/mine", get(mine))
        .route("/{id}", get(show))
        .route("/{id}", delete(destroy))
        .route("/{id}/history", get(history))
        .route("/{id}/status", put(update_status))
        .route("/{id}/assign", put(assign))
        .route("/{id}/reopen", post(reopen))
        .route("/{id}/attachments", post(upload_attachment))
        .route("/{id}/attachments", get(list_attachments))
        .route("/{id}/attachments/{attachment_id}", get(download_attachment))
}
