//! Razorpay payment-gateway adapter.
//!
//! Two jobs: verify webhook deliveries (HMAC-SHA256 over the raw body,
//! constant-time comparison against `X-Razorpay-Signature`) and issue
//! refunds against captured payments. Checkout itself happens in the
//! gateway's hosted widget and never touches this process.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use ad_domain::config::PaymentsConfig;
use ad_domain::error::{Error, Result};

use crate::traits::{PaymentEvent, PaymentGateway};

type HmacSha256 = Hmac<Sha256>;

pub struct RazorpayGateway {
    base_url: String,
    key_id: String,
    key_secret: String,
    webhook_secret: String,
    client: reqwest::Client,
}

impl RazorpayGateway {
    pub fn from_config(cfg: &PaymentsConfig) -> Result<Self> {
        let read = |env: &str| -> Result<String> {
            std::env::var(env)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("env var {env} is not set")))
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Capability {
                capability: "payments",
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            key_id: read(&cfg.key_id_env)?,
            key_secret: read(&cfg.key_secret_env)?,
            webhook_secret: read(&cfg.webhook_secret_env)?,
            client,
        })
    }

    #[cfg(test)]
    fn for_tests(webhook_secret: &str) -> Self {
        Self {
            base_url: "https://api.razorpay.com".into(),
            key_id: "key".into(),
            key_secret: "secret".into(),
            webhook_secret: webhook_secret.into(),
            client: reqwest::Client::new(),
        }
    }

    fn check_signature(&self, body: &[u8], signature: &str) -> Result<()> {
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|e| Error::Capability {
                capability: "payments",
                message: e.to_string(),
            })?;
        mac.update(body);
        let computed = hex::encode(mac.finalize().into_bytes());

        if computed.as_bytes().ct_eq(signature.as_bytes()).unwrap_u8() != 1 {
            return Err(Error::Validation("invalid webhook signature".into()));
        }
        Ok(())
    }

    /// Pull `(order_id, payment_reference)` out of a `payment.captured`
    /// payload. Our order id travels in the payment's `notes`.
    fn parse_event(body: &[u8]) -> Result<PaymentEvent> {
        let payload: Value = serde_json::from_slice(body)
            .map_err(|e| Error::Validation(format!("malformed webhook payload: {e}")))?;

        let event = payload
            .get("event")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation("webhook payload missing event".into()))?;

        if event != "payment.captured" {
            return Ok(PaymentEvent::Ignored {
                event: event.to_string(),
            });
        }

        let entity = payload
            .pointer("/payload/payment/entity")
            .ok_or_else(|| Error::Validation("webhook payload missing payment entity".into()))?;

        let payment_reference = entity
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation("payment entity missing id".into()))?
            .to_string();

        let order_id = entity
            .pointer("/notes/order_id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| Error::Validation("payment notes missing a valid order_id".into()))?;

        Ok(PaymentEvent::Captured {
            order_id,
            payment_reference,
        })
    }
}

#[async_trait::async_trait]
impl PaymentGateway for RazorpayGateway {
    fn verify(&self, body: &[u8], signature: &str) -> Result<PaymentEvent> {
        self.check_signature(body, signature)?;
        Self::parse_event(body)
    }

    async fn refund(&self, payment_reference: &str, amount_minor: u64) -> Result<String> {
        let url = format!("{}/v1/payments/{}/refund", self.base_url, payment_reference);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&serde_json::json!({ "amount": amount_minor }))
            .send()
            .await
            .map_err(|e| Error::Capability {
                capability: "payments",
                message: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(Error::Capability {
                capability: "payments",
                message: format!("refund failed: HTTP {}", resp.status()),
            });
        }

        let json: Value = resp.json().await.map_err(|e| Error::Capability {
            capability: "payments",
            message: e.to_string(),
        })?;

        json.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Capability {
                capability: "payments",
                message: "refund response missing id".into(),
            })
    }
}
