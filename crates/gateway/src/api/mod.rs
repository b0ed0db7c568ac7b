pub mod admin;
pub mod auth;
pub mod chat;
pub mod orders;
pub mod payments;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;

use ad_domain::error::Error;

use crate::state::AppState;

/// Build the full API router.
///
/// Three tiers:
/// - **public**: health probe and the payment webhook (the webhook's
///   HMAC signature is its authentication; external gateways cannot
///   carry our bearer token);
/// - **protected**: user-facing order and chat endpoints, behind the
///   API bearer token;
/// - **admin**: operator endpoints, behind the admin bearer token.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/v1/payments/webhook", post(payments::webhook));

    let protected = Router::new()
        .route("/v1/orders", post(orders::create_order))
        .route("/v1/orders/:id", get(orders::get_order))
        .route("/v1/orders/:id/chat", post(chat::post_chat_message))
        .route("/v1/orders/:id/chat", get(chat::get_chat_history))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_token,
        ));

    let admin = Router::new()
        .route("/v1/admin/orders", get(admin::list_orders))
        .route("/v1/admin/orders/:id/retrigger", post(admin::retrigger))
        .route("/v1/admin/orders/:id/refund", post(admin::refund))
        .layer(middleware::from_fn_with_state(
            state,
            auth::require_admin_token,
        ));

    public.merge(protected).merge(admin)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build a standardized JSON error response: `{ "error": "<code>", "detail": ... }`.
pub(crate) fn api_error(status: StatusCode, code: &str, detail: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": code, "detail": detail.into() })),
    )
        .into_response()
}

/// Map a domain error to its wire representation. User-visible
/// failures surface the category, never internal diagnostics.
pub(crate) fn error_response(err: Error) -> Response {
    match &err {
        Error::Validation(msg) => {
            api_error(StatusCode::BAD_REQUEST, "validation_error", msg.clone())
        }
        Error::QuotaExceeded => api_error(
            StatusCode::TOO_MANY_REQUESTS,
            "quota_exceeded",
            "this order has used all of its chat messages",
        ),
        Error::InvalidTransition { .. } => {
            api_error(StatusCode::CONFLICT, "invalid_transition", err.to_string())
        }
        Error::DuplicateEvent => {
            // Duplicates are acknowledged, not failed; at-least-once
            // delivery means the sender should stop retrying.
            (
                StatusCode::OK,
                Json(serde_json::json!({ "status": "duplicate", "detail": "already processed" })),
            )
                .into_response()
        }
        Error::OrderNotReady => api_error(
            StatusCode::CONFLICT,
            "order_not_ready",
            "the order's analysis has not completed",
        ),
        Error::NotFound(what) => api_error(StatusCode::NOT_FOUND, "not_found", what.clone()),
        Error::Capability { capability, .. } => api_error(
            StatusCode::BAD_GATEWAY,
            "capability_error",
            format!("{capability} is unavailable"),
        ),
        _ => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "unexpected error",
        ),
    }
}
