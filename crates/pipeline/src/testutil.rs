//! Shared mock capabilities and state builders for pipeline tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use ad_capabilities::{ChartEngine, GeocodingProvider, LlmProvider, LlmRequest};
use ad_domain::birth::BirthFacts;
use ad_domain::conversation::{
    ChartData, ConversationState, RequestKind, ResolvedLocation,
};
use ad_domain::error::{Error, Result};

use crate::Capabilities;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mocks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
pub struct CountingGeocoder {
    calls: AtomicU32,
    pub delay_ms: u64,
}

impl CountingGeocoder {
    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            calls: AtomicU32::new(0),
            delay_ms,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodingProvider for CountingGeocoder {
    async fn resolve(&self, place_text: &str) -> Result<ResolvedLocation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        Ok(ResolvedLocation {
            place_name: place_text.to_string(),
            latitude: 12.9716,
            longitude: 77.5946,
            timezone: "Asia/Kolkata".into(),
        })
    }
}

#[derive(Default)]
pub struct CountingCharts {
    calls: AtomicU32,
}

impl CountingCharts {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChartEngine for CountingCharts {
    async fn compute(
        &self,
        _birth: &BirthFacts,
        _location: &ResolvedLocation,
    ) -> Result<serde_json::Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::json!({
            "lagna": { "sign": "Scorpio", "degree": 4.5558 },
            "dasha_periods": [
                { "planet": "Venus", "from": "2019-01-12", "to": "2039-01-12" }
            ],
        }))
    }
}

/// Canned LLM: records every request, replies with a fixed prefix, and
/// can be told to fail when the system prompt contains a marker.
#[derive(Default)]
pub struct CannedLlm {
    requests: Mutex<Vec<LlmRequest>>,
    pub fail_marker: Mutex<Option<String>>,
}

impl CannedLlm {
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().clone()
    }

    pub fn fail_when_system_contains(&self, marker: &str) {
        *self.fail_marker.lock() = Some(marker.to_string());
    }

    pub fn clear_failure(&self) {
        *self.fail_marker.lock() = None;
    }
}

#[async_trait]
impl LlmProvider for CannedLlm {
    async fn generate(&self, req: LlmRequest) -> Result<String> {
        if let Some(marker) = self.fail_marker.lock().as_deref() {
            if req.system.contains(marker) {
                return Err(Error::Capability {
                    capability: "llm",
                    message: "canned failure".into(),
                });
            }
        }
        let reply = format!("generated[{}]", self.requests.lock().len());
        self.requests.lock().push(req);
        Ok(reply)
    }

    fn provider_id(&self) -> &str {
        "canned"
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Capability bundles
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn test_caps() -> Capabilities {
    Capabilities {
        llm: Arc::new(CannedLlm::default()),
        geocoder: Arc::new(CountingGeocoder::default()),
        charts: Arc::new(CountingCharts::default()),
    }
}

pub fn caps_with(geocoder: Arc<CountingGeocoder>) -> Capabilities {
    Capabilities {
        llm: Arc::new(CannedLlm::default()),
        geocoder,
        charts: Arc::new(CountingCharts::default()),
    }
}

pub fn caps_with_charts(charts: Arc<CountingCharts>) -> Capabilities {
    Capabilities {
        llm: Arc::new(CannedLlm::default()),
        geocoder: Arc::new(CountingGeocoder::default()),
        charts,
    }
}

pub fn recording_caps() -> (Capabilities, Arc<CannedLlm>) {
    let llm = Arc::new(CannedLlm::default());
    (
        Capabilities {
            llm: llm.clone(),
            geocoder: Arc::new(CountingGeocoder::default()),
            charts: Arc::new(CountingCharts::default()),
        },
        llm,
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// State builders
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn facts() -> BirthFacts {
    BirthFacts {
        name: "Asha Rao".into(),
        date_of_birth: "1991-04-23".into(),
        time_of_birth: "06:45".into(),
        place_of_birth: "Bengaluru, Karnataka, India".into(),
        latitude: None,
        longitude: None,
        goals: vec!["career".into(), "marriage".into()],
    }
}

pub fn fresh_state(kind: RequestKind) -> ConversationState {
    ConversationState::new(facts(), kind)
}

pub fn located_state() -> ConversationState {
    let mut state = fresh_state(RequestKind::Query);
    state.set_location(ResolvedLocation {
        place_name: "Bengaluru, Karnataka, India".into(),
        latitude: 12.9716,
        longitude: 77.5946,
        timezone: "Asia/Kolkata".into(),
    });
    state
}

pub fn charted_state() -> ConversationState {
    let mut state = located_state();
    state.set_chart(ChartData {
        raw: serde_json::json!({ "lagna": { "sign": "Scorpio" } }),
        analysis: "# Birth Chart Analysis\nLagna: Scorpio".into(),
    });
    state
}

pub fn dasha_state() -> ConversationState {
    let mut state = charted_state();
    state.set_dasha("## Current Dasha Period\nVenus mahadasha".into());
    state
}
