//! Chat stage: answer the trailing user message with derived context.
//!
//! Serves double duty: the terminal stage of a `query` pipeline (the
//! initiating question is already in the message history) and every
//! post-completion follow-up turn on either order kind. Strict
//! alternation is the caller's job; this node only answers a pending
//! user message.

use ad_domain::conversation::{ConversationState, RequestKind, Role};
use ad_domain::error::{Error, Result};

use crate::prompts::{CHAT_SYSTEM, GOCHARA_CONTEXT, QUERY_CHAT_SYSTEM};
use crate::Capabilities;
use ad_capabilities::LlmRequest;

/// How many prior messages travel with each chat turn.
const HISTORY_WINDOW: usize = 20;

/// Generate exactly one assistant reply to the trailing user message
/// and append it to the conversation. Returns the reply text.
pub async fn answer_pending(state: &mut ConversationState, caps: &Capabilities) -> Result<String> {
    let pending = state
        .pending_user_message()
        .ok_or_else(|| Error::Validation("no pending user message to answer".into()))?
        .clone();

    let system = match state.request_kind {
        RequestKind::Query => format!(
            "{QUERY_CHAT_SYSTEM}\n\n{GOCHARA_CONTEXT}\n\n{}",
            query_context(state)?
        ),
        RequestKind::FullReport => format!("{CHAT_SYSTEM}\n\n{}", report_context(state)),
    };

    // Everything before the pending message, bounded.
    let prior = &state.messages[..state.messages.len() - 1];
    let history = prior
        .iter()
        .skip(prior.len().saturating_sub(HISTORY_WINDOW))
        .cloned()
        .collect();

    let reply = caps
        .llm
        .generate(LlmRequest {
            system,
            history,
            user: pending.content,
            temperature: None,
        })
        .await?;

    state.push_message(Role::Assistant, reply.clone());
    Ok(reply)
}

/// Context for a `query` order: chart + dasha only.
fn query_context(state: &ConversationState) -> Result<String> {
    let chart = state
        .chart_data
        .as_ref()
        .ok_or_else(|| Error::Validation("query chat requires chart data".into()))?;
    let dasha = state
        .dasha_data
        .as_ref()
        .ok_or_else(|| Error::Validation("query chat requires dasha data".into()))?;
    Ok(format!(
        "Chart analysis:\n{}\n\nDasha analysis:\n{}",
        chart.analysis, dasha
    ))
}

/// Context for a completed `full_report` order: everything derived.
fn report_context(state: &ConversationState) -> String {
    let mut parts = Vec::new();
    if let Some(summary) = &state.summary {
        parts.push(format!("Report summary:\n{summary}"));
    }
    if let Some(chart) = &state.chart_data {
        parts.push(format!("Chart analysis:\n{}", chart.analysis));
    }
    if let Some(dasha) = &state.dasha_data {
        parts.push(format!("Dasha analysis:\n{dasha}"));
    }
    if let Some(goals) = &state.goal_analysis {
        parts.push(format!("Goal analysis:\n{goals}"));
    }
    if let Some(recs) = &state.recommendations {
        parts.push(format!("Recommendations:\n{recs}"));
    }
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{charted_state, dasha_state, recording_caps};

    #[tokio::test]
    async fn answers_the_pending_message_and_appends_reply() {
        let (caps, llm) = recording_caps();
        let mut state = dasha_state();
        state.push_message(Role::User, "when does my career improve?");

        let reply = answer_pending(&mut state, &caps).await.unwrap();

        assert!(!reply.is_empty());
        let last = state.messages.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, reply);
        // The question itself rides in `user`, not in the history.
        let reqs = llm.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].user, "when does my career improve?");
        assert!(reqs[0].history.is_empty());
    }

    #[tokio::test]
    async fn no_pending_message_is_an_error() {
        let (caps, _) = recording_caps();
        let mut state = dasha_state();
        state.push_message(Role::User, "question");
        state.push_message(Role::Assistant, "answer");

        assert!(matches!(
            answer_pending(&mut state, &caps).await.unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn query_chat_requires_dasha() {
        let (caps, _) = recording_caps();
        let mut state = charted_state();
        state.push_message(Role::User, "question");
        assert!(answer_pending(&mut state, &caps).await.is_err());
    }

    #[tokio::test]
    async fn history_window_is_bounded() {
        let (caps, llm) = recording_caps();
        let mut state = dasha_state();
        for i in 0..30 {
            state.push_message(Role::User, format!("q{i}"));
            state.push_message(Role::Assistant, format!("a{i}"));
        }
        state.push_message(Role::User, "final question");

        answer_pending(&mut state, &caps).await.unwrap();

        let reqs = llm.requests();
        assert_eq!(reqs[0].history.len(), HISTORY_WINDOW);
    }
}
