//! Chat quota guard.
//!
//! Bounds user-authored turns on `query` orders (the initiating query
//! counts as the first message) and serializes turns per order: the
//! next user turn is not accepted until the prior assistant turn
//! resolves. `full_report` post-completion chat is unbounded.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use ad_domain::conversation::{ChatMessage, ConversationState, RequestKind, Role};
use ad_domain::error::{Error, Result};
use ad_domain::order::{Order, OrderStatus};
use ad_pipeline::router::{route, RouteDecision};
use ad_pipeline::stages::chat;
use ad_pipeline::Capabilities;

use crate::locks::OrderLockMap;
use crate::store::OrderStore;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Results
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurnResult {
    pub assistant_reply: String,
    /// `None` means unbounded (`full_report` orders).
    pub messages_remaining: Option<u32>,
    pub can_continue: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatHistory {
    pub messages: Vec<ChatMessage>,
    pub user_message_count: u32,
    pub messages_remaining: Option<u32>,
    pub can_continue: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Guard
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct ChatQuotaGuard {
    store: Arc<OrderStore>,
    locks: Arc<OrderLockMap>,
    caps: Capabilities,
    max_user_messages: u32,
}

impl ChatQuotaGuard {
    pub fn new(
        store: Arc<OrderStore>,
        locks: Arc<OrderLockMap>,
        caps: Capabilities,
        max_user_messages: u32,
    ) -> Self {
        Self {
            store,
            locks,
            caps,
            max_user_messages,
        }
    }

    fn remaining(&self, convo: &ConversationState) -> Option<u32> {
        match convo.request_kind {
            RequestKind::Query => Some(
                self.max_user_messages
                    .saturating_sub(convo.user_message_count()),
            ),
            RequestKind::FullReport => None,
        }
    }

    /// Whether the order can accept another user turn right now.
    pub fn can_accept(&self, order: &Order) -> bool {
        order.status == OrderStatus::Completed
            && self
                .remaining(&order.conversation)
                .map_or(true, |left| left > 0)
    }

    /// Accept one user turn and synchronously produce exactly one
    /// assistant turn. Quota rejection leaves `messages` untouched.
    pub async fn post_message(&self, order_id: Uuid, text: &str) -> Result<ChatTurnResult> {
        // Strict alternation: turns on the same order queue here.
        let _permit = self
            .locks
            .acquire(&order_id)
            .await
            .map_err(|_| Error::NotFound(format!("order {order_id}")))?;

        let order = self
            .store
            .get(&order_id)
            .ok_or_else(|| Error::NotFound(format!("order {order_id}")))?;
        if order.status != OrderStatus::Completed {
            return Err(Error::OrderNotReady);
        }
        if text.trim().is_empty() {
            return Err(Error::Validation("message text is empty".into()));
        }

        let mut convo = order.conversation.clone();

        // The router only hands a message to the chat node once the
        // analysis is complete; anything else is still mid-pipeline.
        if route(&convo, text) != RouteDecision::FreeChat {
            return Err(Error::OrderNotReady);
        }

        if convo.request_kind == RequestKind::Query
            && convo.user_message_count() >= self.max_user_messages
        {
            tracing::info!(order_id = %order_id, "chat quota exhausted");
            return Err(Error::QuotaExceeded);
        }

        convo.push_message(Role::User, text.trim());
        let assistant_reply = chat::answer_pending(&mut convo, &self.caps).await?;

        self.store.update(&order_id, |o| {
            o.conversation = convo.clone();
            Ok(())
        })?;

        let messages_remaining = self.remaining(&convo);
        Ok(ChatTurnResult {
            assistant_reply,
            messages_remaining,
            can_continue: messages_remaining.map_or(true, |left| left > 0),
        })
    }

    pub fn history(&self, order_id: Uuid) -> Result<ChatHistory> {
        let order = self
            .store
            .get(&order_id)
            .ok_or_else(|| Error::NotFound(format!("order {order_id}")))?;
        let convo = &order.conversation;
        let messages_remaining = self.remaining(convo);
        Ok(ChatHistory {
            messages: convo.messages.clone(),
            user_message_count: convo.user_message_count(),
            messages_remaining,
            can_continue: order.status == OrderStatus::Completed
                && messages_remaining.map_or(true, |left| left > 0),
        })
    }
}
