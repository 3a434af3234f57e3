//! Audit trail endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use reportd_common::{AppError, AppResult};
use reportd_core::access;
use reportd_db::entities::{audit_log, user::Role};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Audit log entry response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub id: i64,
    pub action: String,
    pub user_id: Option<i32>,
    pub user_external_id: Option<String>,
    pub user_role: Option<String>,
    pub ip_address: Option<String>,
    pub endpoint: Option<String>,
    pub report_id: Option<i64>,
    pub created_at: String,
}

impl From<audit_log::Model> for AuditLogResponse {
    fn from(e: audit_log::Model) -> Self {
        Self {
            id: e.id,
            action: e.action,
            user_id: e.user_id,
            user_external_id: e.user_external_id,
            user_role: e.user_role,
            ip_address: e.ip_address,
            endpoint: e.endpoint,
            report_id: e.report_id,
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

/// Listing request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    100
}

/// Recent audit trail entries, newest first. Admin rank and above only.
async fn list(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListAuditQuery>,
) -> AppResult<ApiResponse<Vec<AuditLogResponse>>> {
    if !access::dominates(actor.role, Role::Admin) {
        return Err(AppError::Forbidden("Admin rank required".to_string()));
    }

    let entries = state.audit_service.recent(query.limit.min(500)).await?;
    Ok(ApiResponse::ok(entries.into_iter().map(Into::into).collect()))
}

/// Create the audit router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}
