//! HTTP API layer for reportd.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: report intake, staff workflows, analytics
//! - **Extractors**: authentication, trusted-client verification
//! - **Middleware**: session resolution, request context capture
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
