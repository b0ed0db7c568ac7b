//! Admin endpoints: operator recovery and refunds.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use uuid::Uuid;

use ad_domain::order::OrderStatus;

use crate::state::AppState;

use super::error_response;
use super::orders::order_summary;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// When true, list only orders stuck in `processing` past the
    /// configured ceiling.
    #[serde(default)]
    pub stale: bool,
    #[serde(default = "d_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn d_limit() -> usize {
    50
}

/// `GET /v1/admin/orders`
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    if query.stale {
        let stale = state.lifecycle.stale_processing();
        let items: Vec<_> = stale.iter().map(order_summary).collect();
        return Json(serde_json::json!({ "orders": items, "total": items.len() }))
            .into_response();
    }

    let (orders, total) = state.store.list(query.status, query.limit, query.offset);
    let items: Vec<_> = orders.iter().map(order_summary).collect();
    Json(serde_json::json!({ "orders": items, "total": total })).into_response()
}

/// `POST /v1/admin/orders/:id/retrigger`
///
/// Re-runs a `full_report` order's pipeline with skip-if-present
/// semantics. `query` orders are never retriggerable.
pub async fn retrigger(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.lifecycle.admin_retrigger(order_id) {
        Ok(status) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "order_id": order_id, "status": status })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// `POST /v1/admin/orders/:id/refund`
pub async fn refund(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.lifecycle.admin_refund(order_id).await {
        Ok(order) => Json(order_summary(&order)).into_response(),
        Err(err) => error_response(err),
    }
}
