use async_trait::async_trait;
use uuid::Uuid;

use ad_domain::birth::BirthFacts;
use ad_domain::conversation::{ChatMessage, ResolvedLocation};
use ad_domain::error::Result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single generation request: a system instruction, optional
/// conversation history, and the user prompt.
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub system: String,
    pub history: Vec<ChatMessage>,
    pub user: String,
    /// Sampling temperature override. `None` uses the configured default.
    pub temperature: Option<f32>,
}

/// Text generation. Non-deterministic and fallible; retry policy is the
/// call site's concern, never the stage logic's.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, req: LlmRequest) -> Result<String>;

    /// A unique identifier for this provider instance.
    fn provider_id(&self) -> &str;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Geocoding
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resolve a free-form place string to coordinates plus the corrected
/// timezone. Returns [`ad_domain::Error::NotFound`] when the place
/// cannot be resolved.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn resolve(&self, place_text: &str) -> Result<ResolvedLocation>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chart engine
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Chart mathematics. Deterministic given identical input; callers
/// rely on this to compute a chart once per order and reuse it.
#[async_trait]
pub trait ChartEngine: Send + Sync {
    async fn compute(
        &self,
        birth: &BirthFacts,
        location: &ResolvedLocation,
    ) -> Result<serde_json::Value>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Payments
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Outcome of verifying a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    /// A `payment.captured` event naming one of our orders.
    Captured {
        order_id: Uuid,
        payment_reference: String,
    },
    /// A valid event we do not act on (authorized, failed, ...).
    Ignored { event: String },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Verify the webhook signature over the raw body and parse the
    /// event. Fails with [`ad_domain::Error::Validation`] on a bad
    /// signature or malformed payload.
    fn verify(&self, body: &[u8], signature: &str) -> Result<PaymentEvent>;

    /// Issue a refund against a captured payment; returns the gateway's
    /// refund reference.
    async fn refund(&self, payment_reference: &str, amount_minor: u64) -> Result<String>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Delivery
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Report delivery (email).
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<()>;
}
