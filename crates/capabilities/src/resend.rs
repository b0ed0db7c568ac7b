//! Resend email adapter: the delivery channel for finished reports.

use serde_json::Value;

use ad_domain::config::DeliveryConfig;
use ad_domain::error::{Error, Result};

use crate::traits::DeliveryChannel;

pub struct ResendDelivery {
    base_url: String,
    api_key: String,
    from_address: String,
    client: reqwest::Client,
}

impl ResendDelivery {
    pub fn from_config(cfg: &DeliveryConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config(format!("env var {} is not set", cfg.api_key_env)))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_sec))
            .build()
            .map_err(|e| Error::Capability {
                capability: "delivery",
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            from_address: cfg.from_address.clone(),
            client,
        })
    }

    fn build_body(&self, recipient: &str, subject: &str, html_body: &str) -> Value {
        serde_json::json!({
            "from": self.from_address,
            "to": [recipient],
            "subject": subject,
            "html": html_body,
        })
    }
}

#[async_trait::async_trait]
impl DeliveryChannel for ResendDelivery {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<()> {
        let url = format!("{}/emails", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(recipient, subject, html_body))
            .send()
            .await
            .map_err(|e| Error::Capability {
                capability: "delivery",
                message: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(Error::Capability {
                capability: "delivery",
                message: format!("HTTP {}", resp.status()),
            });
        }

        tracing::info!(recipient, subject, "report delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_addresses_the_recipient() {
        let delivery = ResendDelivery {
            base_url: "https://api.resend.com".into(),
            api_key: "re_test".into(),
            from_address: "AstroDesk <reports@astrodesk.example>".into(),
            client: reqwest::Client::new(),
        };
        let body = delivery.build_body("asha@example.com", "Your Report", "<p>hi</p>");
        assert_eq!(body["to"][0], "asha@example.com");
        assert_eq!(body["subject"], "Your Report");
        assert!(body["from"].as_str().unwrap().contains("reports@"));
    }
}
