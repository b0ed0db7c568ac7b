//! Dasha stage: Vimshottari period analysis from the formatted chart.

use ad_domain::conversation::ConversationState;
use ad_domain::error::{Error, Result};

use crate::prompts::{DASHA_SYSTEM, GOCHARA_CONTEXT};
use crate::Capabilities;
use ad_capabilities::LlmRequest;

pub async fn run(state: &mut ConversationState, caps: &Capabilities) -> Result<()> {
    let chart = state
        .chart_data
        .as_ref()
        .ok_or_else(|| Error::Validation("dasha stage requires chart data".into()))?;

    let user = format!(
        "Analyze the dasha periods for this chart.\n\n{}\n\nChart analysis:\n{}\n\n\
         Raw dasha periods from the chart engine:\n{}",
        GOCHARA_CONTEXT,
        chart.analysis,
        serde_json::to_string_pretty(
            chart.raw.get("dasha_periods").unwrap_or(&serde_json::Value::Null)
        )?,
    );

    let analysis = caps
        .llm
        .generate(LlmRequest {
            system: DASHA_SYSTEM.into(),
            history: Vec::new(),
            user,
            temperature: None,
        })
        .await?;

    state.set_dasha(analysis);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{charted_state, test_caps};

    #[tokio::test]
    async fn requires_chart() {
        let caps = test_caps();
        let mut state = crate::testutil::located_state();
        assert!(matches!(
            run(&mut state, &caps).await.unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn writes_dasha_analysis() {
        let caps = test_caps();
        let mut state = charted_state();
        run(&mut state, &caps).await.unwrap();
        assert!(state.dasha_data.is_some());
    }
}
