//! Summarizer stage: the terminal synthesis of a full report.

use ad_domain::conversation::ConversationState;
use ad_domain::error::{Error, Result};

use crate::prompts::SUMMARY_SYSTEM;
use crate::Capabilities;
use ad_capabilities::LlmRequest;

pub async fn run(state: &mut ConversationState, caps: &Capabilities) -> Result<()> {
    let missing = |what: &str| Error::Validation(format!("summarizer requires {what}"));
    let chart = state.chart_data.as_ref().ok_or_else(|| missing("chart data"))?;
    let dasha = state.dasha_data.as_ref().ok_or_else(|| missing("dasha data"))?;
    let goals = state
        .goal_analysis
        .as_ref()
        .ok_or_else(|| missing("goal analysis"))?;
    let recommendations = state
        .recommendations
        .as_ref()
        .ok_or_else(|| missing("recommendations"))?;

    let facts = &state.birth_facts;
    let user = format!(
        "Summarize this complete analysis for {} (born {} at {} in {}; goals: {}).\n\n\
         Chart analysis:\n{}\n\nDasha analysis:\n{}\n\nGoal analysis:\n{}\n\n\
         Recommendations:\n{}",
        facts.name,
        facts.date_of_birth,
        facts.time_of_birth,
        facts.place_of_birth,
        if facts.goals.is_empty() { "general".into() } else { facts.goals.join(", ") },
        chart.analysis,
        dasha,
        goals,
        recommendations,
    );

    let summary = caps
        .llm
        .generate(LlmRequest {
            system: SUMMARY_SYSTEM.into(),
            history: Vec::new(),
            user,
            temperature: None,
        })
        .await?;

    state.set_summary(summary);
    Ok(())
}
