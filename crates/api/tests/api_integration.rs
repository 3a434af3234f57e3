//! API integration tests.
//!
//! These tests verify the API endpoints work correctly together.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use reportd_api::{middleware::AppState, router as api_router};
use reportd_common::storage::LocalStorage;
use reportd_core::{AnalyticsService, AuditService, NullNotifier, ReportService, UserService};
use chrono::Utc;
use reportd_db::entities::{
    audit_log,
    user::{self, Role},
};
use reportd_db::repositories::{AuditLogRepository, ReportRepository, UserRepository};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use std::sync::Arc;
use tower::ServiceExt;

const TEST_CLIENT_KEY: &str = "test-client-key";

/// Create a mock database connection.
fn create_mock_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection()
}

/// Create test app state around the given mock connection.
fn create_state_with(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let audit_repo = AuditLogRepository::new(Arc::clone(&db));

    let user_service = UserService::new(user_repo.clone());
    let report_service = ReportService::new(
        report_repo.clone(),
        user_repo.clone(),
        Arc::new(NullNotifier),
    );
    let analytics_service = AnalyticsService::new(report_repo, user_repo);
    let audit_service = AuditService::new(audit_repo);

    let upload_dir = std::env::temp_dir().join("reportd-api-test-uploads");

    AppState {
        user_service,
        report_service,
        analytics_service,
        audit_service,
        storage: Arc::new(LocalStorage::new(upload_dir)),
        client_api_key: TEST_CLIENT_KEY.to_string(),
        max_attachment_size: 10 * 1024 * 1024,
    }
}

/// Create a test router around the given mock connection.
fn create_router_with(db: DatabaseConnection) -> Router {
    let state = create_state_with(db);
    api_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            reportd_api::middleware::auth_middleware,
        ))
        .layer(axum::middleware::from_fn(
            reportd_api::middleware::context_middleware,
        ))
        .with_state(state)
}

/// Create the test router.
fn create_test_router() -> Router {
    create_router_with(create_mock_db())
}

/// A staff account row, as the auth middleware resolves it.
fn staff_row(id: i32, role: Role) -> user::Model {
    user::Model {
        id,
        external_id: format!("ext-{id}"),
        username: format!("user{id}"),
        avatar_url: None,
        email: None,
        role,
        token: Some("session-token".to_string()),
        last_login_at: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_reports_requires_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_report_requires_client_key() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"type":"feedback","category":"general","description":"Works great"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_report_rejects_wrong_client_key() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("X-Client-Key", "wrong-key")
                .body(Body::from(
                    r#"{"type":"feedback","category":"general","description":"Works great"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_report_validates_body() {
    let app = create_test_router();

    // Blank description fails validation before touching the database.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("X-Client-Key", TEST_CLIENT_KEY)
                .body(Body::from(
                    r#"{"type":"feedback","category":"general","description":"   "}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_report_rejects_unknown_type() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("X-Client-Key", TEST_CLIENT_KEY)
                .body(Body::from(
                    r#"{"type":"gossip","category":"general","description":"hello"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_update_status_requires_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports/1/status")
                .method("PUT")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"status":"in_progress"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reopen_requires_client_key() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports/1/reopen")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"externalId":"ext-1","reason":"still broken after the fix"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dashboard_requires_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/analytics/dashboard")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_audit_log_requires_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/audit")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_audit_log_requires_admin() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[staff_row(1, Role::Support)]])
        .into_connection();
    let app = create_router_with(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/audit")
                .method("GET")
                .header("Authorization", "Bearer session-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_audit_log_lists_for_admin() {
    let entry = audit_log::Model {
        id: 1,
        action: "report.status_update".to_string(),
        user_id: Some(1),
        user_external_id: Some("ext-1".to_string()),
        user_role: Some("admin".to_string()),
        ip_address: None,
        user_agent: None,
        endpoint: Some("PUT /api/reports/1/status".to_string()),
        report_id: Some(1),
        created_at: Utc::now().into(),
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[staff_row(1, Role::Admin)]])
        .append_query_results([[entry]])
        .into_connection();
    let app = create_router_with(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/audit")
                .method("GET")
                .header("Authorization", "Bearer session-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_json_returns_error() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/session")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("X-Client-Key", TEST_CLIENT_KEY)
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}
