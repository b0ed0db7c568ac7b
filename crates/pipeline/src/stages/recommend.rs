//! Recommendation stage: actionable suggestions from the full analysis.

use ad_domain::conversation::ConversationState;
use ad_domain::error::{Error, Result};

use crate::prompts::{GOCHARA_CONTEXT, RECOMMEND_SYSTEM};
use crate::Capabilities;
use ad_capabilities::LlmRequest;

pub async fn run(state: &mut ConversationState, caps: &Capabilities) -> Result<()> {
    let chart = state
        .chart_data
        .as_ref()
        .ok_or_else(|| Error::Validation("recommendations require chart data".into()))?;
    let dasha = state
        .dasha_data
        .as_ref()
        .ok_or_else(|| Error::Validation("recommendations require dasha data".into()))?;
    let goals = state
        .goal_analysis
        .as_ref()
        .ok_or_else(|| Error::Validation("recommendations require goal analysis".into()))?;

    let user = format!(
        "{}\n\nChart analysis:\n{}\n\nDasha analysis:\n{}\n\nGoal analysis:\n{}",
        GOCHARA_CONTEXT, chart.analysis, dasha, goals,
    );

    let text = caps
        .llm
        .generate(LlmRequest {
            system: RECOMMEND_SYSTEM.into(),
            history: Vec::new(),
            user,
            temperature: None,
        })
        .await?;

    state.set_recommendations(text);
    Ok(())
}
