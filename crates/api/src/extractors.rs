//! Request extractors.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
};
use reportd_db::entities::user;

use crate::middleware::{AppState, RequestContext};

/// Authenticated staff member extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get user from request extensions (set by auth middleware)
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// Optional authenticated staff member extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// Trusted-client extractor.
///
/// Succeeds only when the request carries the shared client API key.
/// Report intake and session exchange go through trusted backends, never
/// directly from end users.
#[derive(Debug, Clone, Copy)]
pub struct TrustedClient;

impl<S> FromRequestParts<S> for TrustedClient
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let presented = parts
            .headers
            .get("x-client-key")
            .and_then(|v| v.to_str().ok());

        match presented {
            Some(key) if key == app_state.client_api_key => Ok(Self),
            _ => Err((StatusCode::UNAUTHORIZED, "Invalid client key")),
        }
    }
}

/// Request context extractor. Always succeeds; fields are empty when the
/// context middleware is not installed.
#[derive(Debug, Clone, Default)]
pub struct Context(pub RequestContext);

impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts.extensions.get::<RequestContext>().cloned().unwrap_or_default(),
        ))
    }
}
