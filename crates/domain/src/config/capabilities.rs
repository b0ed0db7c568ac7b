use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Geocoding
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "d_geocoding_base_url")]
    pub base_url: String,
    /// Nominatim requires an identifying User-Agent with a contact.
    #[serde(default = "d_geocoding_user_agent")]
    pub user_agent: String,
    #[serde(default = "d_short_timeout")]
    pub timeout_sec: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: d_geocoding_base_url(),
            user_agent: d_geocoding_user_agent(),
            timeout_sec: d_short_timeout(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chart engine
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The chart-mathematics service is external; we only carry its address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "d_chart_base_url")]
    pub base_url: String,
    #[serde(default = "d_chart_timeout")]
    pub timeout_sec: u64,
    /// How many years of dasha periods to request.
    #[serde(default = "d_years_ahead")]
    pub years_ahead: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            base_url: d_chart_base_url(),
            timeout_sec: d_chart_timeout(),
            years_ahead: d_years_ahead(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Payments
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default = "d_payments_base_url")]
    pub base_url: String,
    #[serde(default = "d_key_id_env")]
    pub key_id_env: String,
    #[serde(default = "d_key_secret_env")]
    pub key_secret_env: String,
    #[serde(default = "d_webhook_secret_env")]
    pub webhook_secret_env: String,
    #[serde(default = "d_currency")]
    pub currency: String,
    /// Price of a full report, smallest currency unit.
    #[serde(default = "d_full_report_amount")]
    pub full_report_amount_minor: u64,
    /// Price of a single bounded query, smallest currency unit.
    #[serde(default = "d_query_amount")]
    pub query_amount_minor: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            base_url: d_payments_base_url(),
            key_id_env: d_key_id_env(),
            key_secret_env: d_key_secret_env(),
            webhook_secret_env: d_webhook_secret_env(),
            currency: d_currency(),
            full_report_amount_minor: d_full_report_amount(),
            query_amount_minor: d_query_amount(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Delivery
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default = "d_delivery_base_url")]
    pub base_url: String,
    #[serde(default = "d_delivery_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_from_address")]
    pub from_address: String,
    #[serde(default = "d_short_timeout")]
    pub timeout_sec: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            base_url: d_delivery_base_url(),
            api_key_env: d_delivery_api_key_env(),
            from_address: d_from_address(),
            timeout_sec: d_short_timeout(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".into()
}
fn d_geocoding_user_agent() -> String {
    "AstroDesk/0.1 (support@astrodesk.example)".into()
}
fn d_chart_base_url() -> String {
    "http://127.0.0.1:8600".into()
}
fn d_chart_timeout() -> u64 {
    60
}
fn d_years_ahead() -> u32 {
    10
}
fn d_payments_base_url() -> String {
    "https://api.razorpay.com".into()
}
fn d_key_id_env() -> String {
    "ASTRODESK_RAZORPAY_KEY_ID".into()
}
fn d_key_secret_env() -> String {
    "ASTRODESK_RAZORPAY_KEY_SECRET".into()
}
fn d_webhook_secret_env() -> String {
    "ASTRODESK_RAZORPAY_WEBHOOK_SECRET".into()
}
fn d_currency() -> String {
    "INR".into()
}
fn d_full_report_amount() -> u64 {
    49_900
}
fn d_query_amount() -> u64 {
    19_900
}
fn d_delivery_base_url() -> String {
    "https://api.resend.com".into()
}
fn d_delivery_api_key_env() -> String {
    "ASTRODESK_RESEND_API_KEY".into()
}
fn d_from_address() -> String {
    "AstroDesk <reports@astrodesk.example>".into()
}
fn d_short_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_defaults() {
        let cfg = PaymentsConfig::default();
        assert_eq!(cfg.currency, "INR");
        assert_eq!(cfg.full_report_amount_minor, 49_900);
        assert!(cfg.full_report_amount_minor > cfg.query_amount_minor);
    }

    #[test]
    fn geocoding_user_agent_carries_contact() {
        let cfg = GeocodingConfig::default();
        assert!(cfg.user_agent.contains('@'));
    }
}
