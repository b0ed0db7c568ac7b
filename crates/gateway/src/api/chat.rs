//! Chat endpoints: post-analysis conversation, quota-bounded for
//! `query` orders.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::state::AppState;

use super::error_response;

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    pub text: String,
}

/// `POST /v1/orders/:id/chat`
///
/// Accepts one user turn and returns the assistant reply together with
/// the remaining quota. Fails with `quota_exceeded` or
/// `order_not_ready`.
pub async fn post_chat_message(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<ChatMessageRequest>,
) -> impl IntoResponse {
    match state.chat.post_message(order_id, &body.text).await {
        Ok(turn) => Json(turn).into_response(),
        Err(err) => error_response(err),
    }
}

/// `GET /v1/orders/:id/chat`
pub async fn get_chat_history(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.chat.history(order_id) {
        Ok(history) => Json(history).into_response(),
        Err(err) => error_response(err),
    }
}
