//! Remote chart-engine adapter.
//!
//! The chart mathematics (planetary positions, dasha periods) live in a
//! separate service; this adapter only ships birth facts + resolved
//! location over HTTP and hands the JSON back. The service is
//! deterministic for identical input, which is what lets callers compute
//! a chart once per order and reuse it.

use serde_json::Value;

use ad_domain::birth::BirthFacts;
use ad_domain::config::ChartConfig;
use ad_domain::conversation::ResolvedLocation;
use ad_domain::error::{Error, Result};

use crate::traits::ChartEngine;

pub struct RemoteChartEngine {
    base_url: String,
    years_ahead: u32,
    client: reqwest::Client,
}

impl RemoteChartEngine {
    pub fn from_config(cfg: &ChartConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_sec))
            .build()
            .map_err(|e| Error::Capability {
                capability: "chart",
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            years_ahead: cfg.years_ahead,
            client,
        })
    }

    fn build_request(&self, birth: &BirthFacts, location: &ResolvedLocation) -> Value {
        serde_json::json!({
            "date_of_birth": birth.date_of_birth,
            "time_of_birth": birth.time_of_birth,
            "latitude": location.latitude,
            "longitude": location.longitude,
            "timezone": location.timezone,
            "location_name": location.place_name,
            "years_ahead": self.years_ahead,
        })
    }
}

#[async_trait::async_trait]
impl ChartEngine for RemoteChartEngine {
    async fn compute(
        &self,
        birth: &BirthFacts,
        location: &ResolvedLocation,
    ) -> Result<Value> {
        let url = format!("{}/v1/chart", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&self.build_request(birth, location))
            .send()
            .await
            .map_err(|e| Error::Capability {
                capability: "chart",
                message: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(Error::Capability {
                capability: "chart",
                message: format!("HTTP {}", resp.status()),
            });
        }

        resp.json().await.map_err(|e| Error::Capability {
            capability: "chart",
            message: e.to_string(),
        })
    }
}
