//! API endpoints.

mod analytics;
mod audit;
mod auth;
mod reports;
mod users;

use axum::{Json, Router, routing::get};
use serde_json::json;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router())
        .nest("/reports", reports::router())
        .nest("/users", users::router())
        .nest("/analytics", analytics::router())
        .nest("/audit", audit::router())
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
