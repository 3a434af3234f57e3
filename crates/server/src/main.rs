//! reportd server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, middleware};
use reportd_api::{middleware::AppState, router as api_router};
use reportd_common::{Config, storage::LocalStorage};
use reportd_core::{
    AnalyticsService, AuditService, Notifier, NullNotifier, ReportService, UserService,
    WebhookNotifier,
};
use reportd_db::repositories::{AuditLogRepository, ReportRepository, UserRepository};
use reportd_queue::{MaintenanceExecutor, SchedulerConfig, run_scheduler};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reportd=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting reportd server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = reportd_db::connect(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    reportd_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let audit_repo = AuditLogRepository::new(Arc::clone(&db));

    // Pick the lifecycle notifier based on configuration
    let notifier: Arc<dyn Notifier> = match (
        config.notifier.webhook_url.clone(),
        config.notifier.webhook_secret.clone(),
    ) {
        (Some(url), Some(secret)) => {
            info!(url = %url, "Webhook notifications enabled");
            Arc::new(WebhookNotifier::new(url, secret))
        }
        _ => {
            info!("Webhook notifications disabled");
            Arc::new(NullNotifier)
        }
    };

    // Initialize services
    let user_service = UserService::new(user_repo.clone());
    let report_service = ReportService::new(
        report_repo.clone(),
        user_repo.clone(),
        Arc::clone(&notifier),
    );
    let analytics_service = AnalyticsService::new(report_repo.clone(), user_repo.clone());
    let audit_service = AuditService::new(audit_repo);

    // Initialize attachment storage
    let upload_dir = PathBuf::from(&config.storage.upload_dir);
    tokio::fs::create_dir_all(&upload_dir).await?;
    let storage = Arc::new(LocalStorage::new(upload_dir));

    // Create app state
    let state = AppState {
        user_service,
        report_service: report_service.clone(),
        analytics_service: analytics_service.clone(),
        audit_service: audit_service.clone(),
        storage,
        client_api_key: config.auth.client_api_key.clone(),
        max_attachment_size: config.storage.max_file_size_mb * 1024 * 1024,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            reportd_api::middleware::auth_middleware,
        ))
        .layer(middleware::from_fn(
            reportd_api::middleware::context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the maintenance scheduler
    let scheduler_config = SchedulerConfig::from_jobs_config(&config.jobs);
    let executor =
        MaintenanceExecutor::new(report_service, analytics_service, audit_service).into_shared();
    run_scheduler(scheduler_config, executor).await;
    info!("Maintenance scheduler started");

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
