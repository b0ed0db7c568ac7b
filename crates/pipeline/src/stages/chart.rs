//! Chart stage: compute the chart once, then format it for humans.
//!
//! The engine output is deterministic and reused by every downstream
//! stage, and is computed exactly once per order's lifetime.

use ad_domain::conversation::{ChartData, ConversationState};
use ad_domain::error::{Error, Result};

use crate::prompts::CHART_SYSTEM;
use crate::Capabilities;
use ad_capabilities::LlmRequest;

pub async fn run(state: &mut ConversationState, caps: &Capabilities) -> Result<()> {
    let location = state
        .location
        .as_ref()
        .ok_or_else(|| Error::Validation("chart stage requires a resolved location".into()))?;

    let raw = caps.charts.compute(&state.birth_facts, location).await?;

    let facts = &state.birth_facts;
    let user = format!(
        "Format this chart data into the report structure.\n\n\
         Birth details:\n- Name: {}\n- Date of birth: {}\n- Time of birth: {} (IST)\n\
         - Place of birth: {}\n\nChart data:\n{}",
        facts.name,
        facts.date_of_birth,
        facts.time_of_birth,
        location.place_name,
        serde_json::to_string_pretty(&raw)?,
    );

    let analysis = caps
        .llm
        .generate(LlmRequest {
            system: CHART_SYSTEM.into(),
            history: Vec::new(),
            user,
            temperature: Some(0.3),
        })
        .await?;

    state.set_chart(ChartData { raw, analysis });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{located_state, test_caps, CountingCharts};
    use std::sync::Arc;

    #[tokio::test]
    async fn requires_location() {
        let caps = test_caps();
        let mut state = crate::testutil::fresh_state(ad_domain::conversation::RequestKind::FullReport);
        let err = run(&mut state, &caps).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn stores_raw_and_analysis() {
        let charts = Arc::new(CountingCharts::default());
        let caps = crate::testutil::caps_with_charts(charts.clone());
        let mut state = located_state();

        run(&mut state, &caps).await.unwrap();

        assert_eq!(charts.calls(), 1);
        let chart = state.chart_data.unwrap();
        assert!(chart.raw.get("lagna").is_some());
        assert!(!chart.analysis.is_empty());
    }
}
