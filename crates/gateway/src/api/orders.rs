//! Order endpoints: creation and status.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

use ad_domain::order::Order;

use crate::lifecycle::CreateOrderRequest;
use crate::state::AppState;

use super::{api_error, error_response};

/// `POST /v1/orders`
///
/// Creates an order in `payment_pending`. The caller then completes
/// checkout against the payment gateway; the webhook moves things
/// forward from there.
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> impl IntoResponse {
    match state.lifecycle.create_order(body) {
        Ok(order) => (StatusCode::CREATED, Json(order_summary(&order))).into_response(),
        Err(err) => error_response(err),
    }
}

/// `GET /v1/orders/:id`
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.get(&order_id) {
        Some(order) => Json(order_summary(&order)).into_response(),
        None => api_error(StatusCode::NOT_FOUND, "not_found", format!("order {order_id}")),
    }
}

/// The wire shape of an order. The full conversation state is internal;
/// callers see status, the analysis snapshot, and payment/refund facts.
pub(crate) fn order_summary(order: &Order) -> serde_json::Value {
    json!({
        "id": order.id,
        "status": order.status,
        "type": order.kind,
        "email": order.email,
        "amount_minor": order.amount_minor,
        "currency": order.currency,
        "analysis_data": order.analysis_data,
        "error_reason": order.error_reason,
        "payment_captured": order.payment.captured,
        "refunded": order.payment.refund_ref.is_some(),
        "created_at": order.created_at,
        "updated_at": order.updated_at,
    })
}
