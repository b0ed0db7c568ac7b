//! Nominatim (OpenStreetMap) geocoding adapter.
//!
//! Free service, no API key; it requires an identifying `User-Agent`
//! and at most one request per second, which the per-order pipeline
//! already guarantees.
//!
//! Birth timezone convention: all birth times in this system are IST,
//! so the corrected timezone is always `Asia/Kolkata` regardless of the
//! resolved place. The name is validated against the tz database once
//! at construction.

use serde_json::Value;

use ad_domain::birth::BIRTH_TIMEZONE;
use ad_domain::config::GeocodingConfig;
use ad_domain::conversation::ResolvedLocation;
use ad_domain::error::{Error, Result};

use crate::traits::GeocodingProvider;

pub struct NominatimGeocoder {
    base_url: String,
    user_agent: String,
    client: reqwest::Client,
}

impl NominatimGeocoder {
    pub fn from_config(cfg: &GeocodingConfig) -> Result<Self> {
        // A typo here would silently produce charts in the wrong zone.
        BIRTH_TIMEZONE
            .parse::<chrono_tz::Tz>()
            .map_err(|e| Error::Config(format!("bad birth timezone: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_sec))
            .build()
            .map_err(|e| Error::Capability {
                capability: "geocoding",
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            user_agent: cfg.user_agent.clone(),
            client,
        })
    }

    /// Parse the first hit of a Nominatim `/search` response.
    fn parse_hits(place_text: &str, hits: &Value) -> Result<ResolvedLocation> {
        let first = hits
            .as_array()
            .and_then(|a| a.first())
            .ok_or_else(|| Error::NotFound(format!("place not found: {place_text}")))?;

        let lat: f64 = first
            .get("lat")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::Capability {
                capability: "geocoding",
                message: "response missing lat".into(),
            })?;
        let lon: f64 = first
            .get("lon")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::Capability {
                capability: "geocoding",
                message: "response missing lon".into(),
            })?;
        let place_name = first
            .get("display_name")
            .and_then(Value::as_str)
            .unwrap_or(place_text)
            .to_string();

        Ok(ResolvedLocation {
            place_name,
            latitude: lat,
            longitude: lon,
            timezone: BIRTH_TIMEZONE.into(),
        })
    }
}

#[async_trait::async_trait]
impl GeocodingProvider for NominatimGeocoder {
    async fn resolve(&self, place_text: &str) -> Result<ResolvedLocation> {
        let url = format!("{}/search", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("q", place_text),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| Error::Capability {
                capability: "geocoding",
                message: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(Error::Capability {
                capability: "geocoding",
                message: format!("HTTP {}", resp.status()),
            });
        }

        let hits: Value = resp.json().await.map_err(|e| Error::Capability {
            capability: "geocoding",
            message: e.to_string(),
        })?;

        let location = Self::parse_hits(place_text, &hits)?;
        tracing::info!(
            place = %location.place_name,
            lat = location.latitude,
            lon = location.longitude,
            "place resolved"
        );
        Ok(location)
    }
}
