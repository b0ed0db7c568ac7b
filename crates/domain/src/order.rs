//! The persisted order entity and its status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::birth::BirthFacts;
use crate::conversation::{ConversationState, RequestKind};
use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Order status
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PaymentPending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl OrderStatus {
    /// Terminal states: no further pipeline execution happens
    /// automatically.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Refunded)
    }

    /// Whether `self → to` is in the legal transition set.
    ///
    /// `failed/completed → processing` is the admin re-trigger path; the
    /// lifecycle controller additionally restricts it to `full_report`
    /// orders.
    pub fn can_transition(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (PaymentPending, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Failed, Processing)
                | (Completed, Processing)
                | (Completed, Refunded)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PaymentPending => "payment_pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Payment record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The payment attached to an order. One per order; lives and dies with
/// it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Gateway-side order reference (created by the checkout flow).
    #[serde(default)]
    pub gateway_order_ref: Option<String>,
    /// Gateway payment reference, the dedupe key for webhook delivery.
    #[serde(default)]
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub captured: bool,
    #[serde(default)]
    pub refund_ref: Option<String>,
    #[serde(default)]
    pub refunded_at: Option<DateTime<Utc>>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Analysis snapshot
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Terminal snapshot of the conversation's derived fields, materialized
/// on the order once it completes. Key names are the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_data_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dasha_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

impl AnalysisData {
    pub fn from_conversation(convo: &ConversationState) -> Self {
        Self {
            summary: convo.summary.clone(),
            chart_data_analysis: convo.chart_data.as_ref().map(|c| c.analysis.clone()),
            dasha_analysis: convo.dasha_data.clone(),
            goal_analysis: convo.goal_analysis.clone(),
            recommendations: convo.recommendations.clone(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Order
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub status: OrderStatus,
    pub kind: RequestKind,
    /// Report recipient.
    pub email: String,
    /// Amount in the smallest currency unit (paise for INR).
    pub amount_minor: u64,
    pub currency: String,
    pub conversation: ConversationState,
    #[serde(default)]
    pub payment: PaymentRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_data: Option<AnalysisData>,
    /// Set only while `failed`; cleared when a retry leaves `failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        birth_facts: BirthFacts,
        kind: RequestKind,
        email: String,
        amount_minor: u64,
        currency: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: OrderStatus::PaymentPending,
            kind,
            email,
            amount_minor,
            currency,
            conversation: ConversationState::new(birth_facts, kind),
            payment: PaymentRecord::default(),
            analysis_data: None,
            error_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a status transition, failing with [`Error::InvalidTransition`]
    /// (and leaving the order untouched) when `to` is not reachable from
    /// the current status.
    pub fn transition(&mut self, to: OrderStatus, op: &'static str) -> Result<()> {
        if !self.status.can_transition(to) {
            return Err(Error::InvalidTransition {
                from: self.status,
                op,
            });
        }
        tracing::info!(order_id = %self.id, from = %self.status, to = %to, "order transition");
        if self.status == OrderStatus::Failed {
            // Leaving `failed` on a successful retry clears the reason.
            self.error_reason = None;
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(kind: RequestKind) -> Order {
        let facts = BirthFacts {
            name: "Asha Rao".into(),
            date_of_birth: "1991-04-23".into(),
            time_of_birth: "06:45".into(),
            place_of_birth: "Bengaluru, India".into(),
            latitude: None,
            longitude: None,
            goals: vec![],
        };
        Order::new(facts, kind, "asha@example.com".into(), 49_900, "INR".into())
    }

    #[test]
    fn happy_path_transitions() {
        let mut o = order(RequestKind::FullReport);
        o.transition(OrderStatus::Processing, "confirm payment").unwrap();
        o.transition(OrderStatus::Completed, "complete").unwrap();
        o.transition(OrderStatus::Refunded, "refund").unwrap();
        assert!(o.status.is_terminal());
    }

    #[test]
    fn illegal_transitions_leave_state_unchanged() {
        let mut o = order(RequestKind::FullReport);
        let err = o.transition(OrderStatus::Completed, "complete").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: OrderStatus::PaymentPending,
                ..
            }
        ));
        assert_eq!(o.status, OrderStatus::PaymentPending);
        assert!(o.error_reason.is_none());

        // Refund is only reachable from completed.
        o.transition(OrderStatus::Processing, "confirm payment").unwrap();
        assert!(o.transition(OrderStatus::Refunded, "refund").is_err());
        assert_eq!(o.status, OrderStatus::Processing);
    }

    #[test]
    fn retry_from_failed_clears_error_reason() {
        let mut o = order(RequestKind::FullReport);
        o.transition(OrderStatus::Processing, "confirm payment").unwrap();
        o.error_reason = Some("dasha: llm_error".into());
        o.transition(OrderStatus::Failed, "fail").unwrap();
        o.transition(OrderStatus::Processing, "retrigger").unwrap();
        assert!(o.error_reason.is_none());
    }

    #[test]
    fn refund_is_irreversible() {
        let mut o = order(RequestKind::FullReport);
        o.transition(OrderStatus::Processing, "confirm payment").unwrap();
        o.transition(OrderStatus::Completed, "complete").unwrap();
        o.transition(OrderStatus::Refunded, "refund").unwrap();
        assert!(o.transition(OrderStatus::Processing, "retrigger").is_err());
        assert!(o.transition(OrderStatus::Completed, "complete").is_err());
    }

    #[test]
    fn analysis_snapshot_uses_wire_keys() {
        let mut o = order(RequestKind::FullReport);
        o.conversation.set_dasha("dasha text".into());
        o.conversation.set_summary("summary text".into());
        let snap = AnalysisData::from_conversation(&o.conversation);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["dasha_analysis"], "dasha text");
        assert_eq!(json["summary"], "summary text");
        assert!(json.get("chart_data_analysis").is_none());
    }
}
