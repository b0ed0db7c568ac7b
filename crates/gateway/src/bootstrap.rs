//! AppState construction shared by `serve` and the test harness.

use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};

use ad_capabilities::chart::RemoteChartEngine;
use ad_capabilities::google::GoogleLlm;
use ad_capabilities::nominatim::NominatimGeocoder;
use ad_capabilities::razorpay::RazorpayGateway;
use ad_capabilities::resend::ResendDelivery;
use ad_capabilities::{DeliveryChannel, PaymentGateway};
use ad_domain::config::{Config, ConfigSeverity};
use ad_pipeline::Capabilities;

use crate::chat_guard::ChatQuotaGuard;
use crate::dedupe::DedupeStore;
use crate::lifecycle::OrderLifecycle;
use crate::locks::OrderLockMap;
use crate::state::AppState;
use crate::store::OrderStore;

/// Validate config, construct the real capability adapters, and return
/// a fully-wired [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Capability adapters ──────────────────────────────────────────
    let caps = Capabilities {
        llm: Arc::new(GoogleLlm::from_config(&config.llm).context("initializing LLM provider")?),
        geocoder: Arc::new(
            NominatimGeocoder::from_config(&config.geocoding)
                .context("initializing geocoder")?,
        ),
        charts: Arc::new(
            RemoteChartEngine::from_config(&config.chart).context("initializing chart engine")?,
        ),
    };
    let payments: Arc<dyn PaymentGateway> = Arc::new(
        RazorpayGateway::from_config(&config.payments).context("initializing payment gateway")?,
    );
    let delivery: Arc<dyn DeliveryChannel> = Arc::new(
        ResendDelivery::from_config(&config.delivery).context("initializing delivery channel")?,
    );

    let store = Arc::new(OrderStore::new(&config.state_path).context("initializing order store")?);

    build_app_state_with(config, store, caps, payments, delivery)
}

/// Wire an [`AppState`] from pre-built parts. Tests use this with mock
/// capabilities; `build_app_state` uses it with the real adapters.
pub fn build_app_state_with(
    config: Arc<Config>,
    store: Arc<OrderStore>,
    caps: Capabilities,
    payments: Arc<dyn PaymentGateway>,
    delivery: Arc<dyn DeliveryChannel>,
) -> anyhow::Result<AppState> {
    let locks = Arc::new(OrderLockMap::new());
    let dedupe = Arc::new(DedupeStore::new());

    let lifecycle = Arc::new(OrderLifecycle::new(
        store.clone(),
        locks.clone(),
        dedupe,
        caps.clone(),
        payments.clone(),
        delivery,
        config.payments.clone(),
        config.pipeline.clone(),
    ));

    let chat = Arc::new(ChatQuotaGuard::new(
        store.clone(),
        locks,
        caps,
        config.quota.max_user_messages,
    ));

    let api_token_hash = token_hash(&config.server.api_token_env);
    if api_token_hash.is_none() {
        tracing::warn!(
            env = %config.server.api_token_env,
            "no API token configured; user endpoints are unauthenticated"
        );
    }
    let admin_token_hash = token_hash(&config.server.admin_token_env);
    if admin_token_hash.is_none() {
        tracing::warn!(
            env = %config.server.admin_token_env,
            "no admin token configured; admin endpoints are disabled"
        );
    }

    Ok(AppState {
        config,
        store,
        lifecycle,
        chat,
        payments,
        api_token_hash,
        admin_token_hash,
    })
}

/// Read a bearer token from the named env var once and keep only its
/// SHA-256 digest.
fn token_hash(env_name: &str) -> Option<Vec<u8>> {
    std::env::var(env_name)
        .ok()
        .filter(|t| !t.is_empty())
        .map(|t| Sha256::digest(t.as_bytes()).to_vec())
}
