//! API middleware.

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use reportd_common::storage::AttachmentStorage;
use reportd_core::{AnalyticsService, AuditService, ReportService, UserService};

/// Request context captured for the audit trail.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub endpoint: Option<String>,
}

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub report_service: ReportService,
    pub analytics_service: AnalyticsService,
    pub audit_service: AuditService,
    pub storage: Arc<dyn AttachmentStorage>,
    /// Shared key trusted clients present for intake and session exchange.
    pub client_api_key: String,
    /// Maximum accepted attachment size in bytes.
    pub max_attachment_size: u64,
}

/// Authentication middleware.
///
/// Resolves a bearer token to a staff account and stashes it in request
/// extensions for the extractors. Unauthenticated requests pass through;
/// handlers decide whether that is acceptable.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

/// Context middleware.
///
/// Captures the caller's address, agent, and endpoint so mutating handlers
/// can attach them to audit entries.
pub async fn context_middleware(mut req: Request<Body>, next: Next) -> Response {
    let ip_address = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let endpoint = Some(format!("{} {}", req.method(), req.uri().path()));

    req.extensions_mut().insert(RequestContext {
        ip_address,
        user_agent,
        endpoint,
    });

    next.run(req).await
}
