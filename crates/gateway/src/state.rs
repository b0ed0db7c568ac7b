//! Shared application state passed to all API handlers.

use std::sync::Arc;

use ad_capabilities::PaymentGateway;
use ad_domain::config::Config;

use crate::chat_guard::ChatQuotaGuard;
use crate::lifecycle::OrderLifecycle;
use crate::store::OrderStore;

/// Fields are grouped by concern:
/// - **Core**: config, order store
/// - **Runtime**: lifecycle controller, chat guard
/// - **Capabilities**: payment gateway (webhook verification)
/// - **Security**: bearer-token hashes computed once at startup
#[derive(Clone)]
pub struct AppState {
    // ── Core ──────────────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub store: Arc<OrderStore>,

    // ── Runtime ───────────────────────────────────────────────────────
    pub lifecycle: Arc<OrderLifecycle>,
    pub chat: Arc<ChatQuotaGuard>,

    // ── Capabilities ──────────────────────────────────────────────────
    pub payments: Arc<dyn PaymentGateway>,

    // ── Security (startup-computed) ───────────────────────────────────
    /// SHA-256 hash of the API bearer token. `None` = dev mode (no auth).
    pub api_token_hash: Option<Vec<u8>>,
    /// SHA-256 hash of the admin bearer token. `None` = admin endpoints
    /// disabled.
    pub admin_token_hash: Option<Vec<u8>>,
}
