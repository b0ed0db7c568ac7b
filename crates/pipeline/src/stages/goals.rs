//! Goal-analysis stage: one focused reading per requested life area.

use ad_domain::conversation::ConversationState;
use ad_domain::error::{Error, Result};

use crate::prompts::GOALS_SYSTEM;
use crate::Capabilities;
use ad_capabilities::LlmRequest;

pub async fn run(state: &mut ConversationState, caps: &Capabilities) -> Result<()> {
    let chart = state
        .chart_data
        .as_ref()
        .ok_or_else(|| Error::Validation("goal analysis requires chart data".into()))?;
    let dasha = state
        .dasha_data
        .as_ref()
        .ok_or_else(|| Error::Validation("goal analysis requires dasha data".into()))?;

    let goals = if state.birth_facts.goals.is_empty() {
        "career, relationships, health, finance".to_string()
    } else {
        state.birth_facts.goals.join(", ")
    };

    let user = format!(
        "Goals to analyze: {goals}\n\nChart analysis:\n{}\n\nDasha analysis:\n{}",
        chart.analysis, dasha,
    );

    let analysis = caps
        .llm
        .generate(LlmRequest {
            system: GOALS_SYSTEM.into(),
            history: Vec::new(),
            user,
            temperature: None,
        })
        .await?;

    state.set_goal_analysis(analysis);
    Ok(())
}
