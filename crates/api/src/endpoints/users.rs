//! Staff account endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, put},
};
use reportd_common::AppResult;
use reportd_core::AuditEntry;
use reportd_db::entities::user::{self, Role};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, Context},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Staff account response. Never exposes the session token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub external_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub last_login_at: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            external_id: u.external_id,
            username: u.username,
            avatar_url: u.avatar_url,
            email: u.email,
            role: u.role.as_str().to_string(),
            last_login_at: u.last_login_at.map(|t| t.to_rfc3339()),
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// List request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    50
}

/// Role change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// List staff accounts.
async fn list(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state
        .user_service
        .list(query.limit.min(100), query.offset)
        .await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// Get a staff account.
async fn show(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Change a staff account's role.
async fn update_role(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Context(ctx): Context,
    Path(id): Path<i32>,
    Json(req): Json<UpdateRoleRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state.user_service.update_role(&actor, id, req.role).await?;

    state
        .audit_service
        .record(AuditEntry {
            user_id: Some(actor.id),
            user_external_id: Some(actor.external_id),
            user_role: Some(actor.role.as_str().to_string()),
            ip_address: ctx.ip_address,
            user_agent: ctx.user_agent,
            endpoint: ctx.endpoint,
            ..AuditEntry::new("user.role_change")
        })
        .await;

    Ok(ApiResponse::ok(updated.into()))
}

/// Delete a staff account.
async fn destroy(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Context(ctx): Context,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    state.user_service.delete(&actor, id).await?;

    state
        .audit_service
        .record(AuditEntry {
            user_id: Some(actor.id),
            user_external_id: Some(actor.external_id),
            user_role: Some(actor.role.as_str().to_string()),
            ip_address: ctx.ip_address,
            user_agent: ctx.user_agent,
            endpoint: ctx.endpoint,
            ..AuditEntry::new("user.delete")
        })
        .await;

    Ok(ok())
}

/// Create the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show))
        .route("/{id}", delete(destroy))
        .route("/{id}/role", put(update_role))
}
