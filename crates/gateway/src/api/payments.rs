//! Payment webhook endpoint.
//!
//! `POST /v1/payments/webhook` receives gateway events (at-least-once
//! delivery). The HMAC signature over the raw body is the route's
//! authentication; duplicate confirmations are acknowledged with 200 so
//! the gateway stops retrying.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};

use ad_capabilities::PaymentEvent;
use ad_domain::error::Error;

use crate::state::AppState;

use super::{api_error, error_response};

pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get("x-razorpay-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let event = match state.payments.verify(&body, signature) {
        Ok(event) => event,
        Err(Error::Validation(msg)) => {
            tracing::warn!(error = %msg, "webhook rejected");
            return api_error(StatusCode::UNAUTHORIZED, "invalid_webhook", msg);
        }
        Err(err) => return error_response(err),
    };

    match event {
        PaymentEvent::Ignored { event } => {
            tracing::debug!(event = %event, "webhook event ignored");
            Json(serde_json::json!({ "status": "ignored", "event": event })).into_response()
        }
        PaymentEvent::Captured {
            order_id,
            payment_reference,
        } => match state
            .lifecycle
            .on_payment_confirmed(order_id, payment_reference)
        {
            Ok(status) => (
                StatusCode::ACCEPTED,
                Json(serde_json::json!({ "order_id": order_id, "status": status })),
            )
                .into_response(),
            // DuplicateEvent maps to a 200 acknowledgement.
            Err(err) => error_response(err),
        },
    }
}
