//! Session endpoints.
//!
//! There are no passwords: a trusted backend verifies the staff member's
//! external platform identity, then exchanges it here for a bearer token.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::{get, post}};
use reportd_common::{AppError, AppResult};
use reportd_core::{AuditEntry, user::LoginInput};
use serde::Deserialize;

use super::users::UserResponse;
use crate::{
    extractors::{AuthUser, Context, TrustedClient},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Session exchange request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub external_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

/// Session response.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Exchange a verified external identity for a session token.
async fn create_session(
    _client: TrustedClient,
    State(state): State<AppState>,
    Context(ctx): Context,
    Json(req): Json<SessionRequest>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let user = state
        .user_service
        .login(LoginInput {
            external_id: req.external_id,
            username: req.username,
            avatar_url: req.avatar_url,
            email: req.email,
        })
        .await?;

    let token = user
        .token
        .clone()
        .ok_or_else(|| AppError::Internal("Login produced no token".to_string()))?;

    state
        .audit_service
        .record(AuditEntry {
            action: "auth.login".to_string(),
            user_id: Some(user.id),
            user_external_id: Some(user.external_id.clone()),
            user_role: Some(user.role.as_str().to_string()),
            ip_address: ctx.ip_address,
            user_agent: ctx.user_agent,
            endpoint: ctx.endpoint,
            report_id: None,
        })
        .await;

    Ok(ApiResponse::ok(SessionResponse {
        token,
        user: user.into(),
    }))
}

/// Invalidate the current session.
async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Context(ctx): Context,
) -> AppResult<impl IntoResponse> {
    let entry = AuditEntry {
        action: "auth.logout".to_string(),
        user_id: Some(user.id),
        user_external_id: Some(user.external_id.clone()),
        user_role: Some(user.role.as_str().to_string()),
        ip_address: ctx.ip_address,
        user_agent: ctx.user_agent,
        endpoint: ctx.endpoint,
        report_id: None,
    };

    state.user_service.logout(user).await?;
    state.audit_service.record(entry).await;

    Ok(ok())
}

/// Current session's account.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(user.into())
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", post(create_session))
        .route("/logout", post(logout))
        .route("/me", get(me))
}
