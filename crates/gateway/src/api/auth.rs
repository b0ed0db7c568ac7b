//! API authentication middleware.
//!
//! Bearer tokens are read from env once at startup and only their
//! SHA-256 digests are kept in `AppState`.
//! - API token unset → warn once at startup and allow unauthenticated
//!   access (dev mode).
//! - Admin token unset → admin endpoints are disabled (403).

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Enforce bearer-token authentication on the protected router.
pub async fn require_api_token(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let expected_hash = match &state.api_token_hash {
        Some(h) => h,
        None => return next.run(req).await,
    };

    if token_matches(&req, expected_hash) {
        next.run(req).await
    } else {
        (
            axum::http::StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({ "error": "invalid or missing API token" })),
        )
            .into_response()
    }
}

/// Enforce the admin token. Unlike the API token, absence means the
/// endpoints are off, not open.
pub async fn require_admin_token(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let expected_hash = match &state.admin_token_hash {
        Some(h) => h,
        None => {
            return (
                axum::http::StatusCode::FORBIDDEN,
                axum::Json(serde_json::json!({ "error": "admin endpoints are disabled" })),
            )
                .into_response();
        }
    };

    if token_matches(&req, expected_hash) {
        next.run(req).await
    } else {
        (
            axum::http::StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({ "error": "invalid or missing admin token" })),
        )
            .into_response()
    }
}

/// Hash the provided token to a fixed-length digest, then compare in
/// constant time, avoiding leaking the token length.
fn token_matches(req: &Request<Body>, expected_hash: &[u8]) -> bool {
    let provided = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    let provided_hash = Sha256::digest(provided.as_bytes());
    bool::from(provided_hash.ct_eq(expected_hash))
}
