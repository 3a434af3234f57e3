//! Analytics endpoints.

use axum::{Router, extract::State, routing::get};
use reportd_common::AppResult;
use reportd_core::analytics::{DashboardStats, PublicStats};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Staff dashboard statistics.
async fn dashboard(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<DashboardStats>> {
    let stats = state.analytics_service.dashboard().await?;
    Ok(ApiResponse::ok(stats))
}

/// Public statistics.
async fn public_stats(State(state): State<AppState>) -> AppResult<ApiResponse<PublicStats>> {
    let stats = state.analytics_service.public_stats().await?;
    Ok(ApiResponse::ok(stats))
}

/// Create the analytics router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/public", get(public_stats))
}
