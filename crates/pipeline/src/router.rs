//! Intent router: decides what an inbound message means for an order.
//!
//! Deterministic and side-effect free: the same state and message always
//! produce the same decision. Invoked at the entry point of each
//! request, never again during the same flow.

use ad_domain::conversation::ConversationState;

/// What to do with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Birth facts are complete and nothing has run yet: start the
    /// analysis from the first stage.
    BeginAnalysis,
    /// Analysis is unfinished: either birth facts need correcting
    /// (`missing` names them) or a partial run needs resuming.
    ContinueAnalysis { missing: Vec<&'static str> },
    /// Analysis is complete: hand the message to the chat node with
    /// full derived context.
    FreeChat,
}

/// Classify the latest inbound message against the conversation state.
pub fn route(state: &ConversationState, _message: &str) -> RouteDecision {
    if state.analysis_complete {
        return RouteDecision::FreeChat;
    }

    let missing = state.birth_facts.missing_fields();
    if !missing.is_empty() || state.birth_facts.validate().is_err() {
        return RouteDecision::ContinueAnalysis { missing };
    }

    // Facts are complete. If any stage already produced output this is a
    // resumption, not a fresh start, but the controller skips populated
    // stages either way.
    let any_stage_ran = state.location.is_some()
        || state.chart_data.is_some()
        || state.dasha_data.is_some();
    if any_stage_ran {
        RouteDecision::ContinueAnalysis { missing: Vec::new() }
    } else {
        RouteDecision::BeginAnalysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_domain::birth::BirthFacts;
    use ad_domain::conversation::{RequestKind, ResolvedLocation};

    fn complete_facts() -> BirthFacts {
        BirthFacts {
            name: "Asha Rao".into(),
            date_of_birth: "1991-04-23".into(),
            time_of_birth: "06:45".into(),
            place_of_birth: "Bengaluru, India".into(),
            latitude: None,
            longitude: None,
            goals: vec![],
        }
    }

    #[test]
    fn complete_facts_begin_analysis() {
        let state = ConversationState::new(complete_facts(), RequestKind::FullReport);
        assert_eq!(route(&state, "please analyze"), RouteDecision::BeginAnalysis);
    }

    #[test]
    fn incomplete_facts_continue_analysis_naming_missing() {
        let mut facts = complete_facts();
        facts.date_of_birth = "sometime in April".into();
        let state = ConversationState::new(facts, RequestKind::FullReport);
        assert_eq!(
            route(&state, "here are my details"),
            RouteDecision::ContinueAnalysis {
                missing: vec!["date_of_birth"]
            }
        );
    }

    #[test]
    fn completed_analysis_routes_to_chat() {
        let mut state = ConversationState::new(complete_facts(), RequestKind::FullReport);
        state.mark_complete();
        assert_eq!(route(&state, "what about my career?"), RouteDecision::FreeChat);
    }

    #[test]
    fn partial_run_is_a_resumption() {
        let mut state = ConversationState::new(complete_facts(), RequestKind::FullReport);
        state.set_location(ResolvedLocation {
            place_name: "Bengaluru".into(),
            latitude: 12.97,
            longitude: 77.59,
            timezone: "Asia/Kolkata".into(),
        });
        assert_eq!(
            route(&state, "continue"),
            RouteDecision::ContinueAnalysis { missing: vec![] }
        );
    }

    #[test]
    fn routing_is_idempotent() {
        let state = ConversationState::new(complete_facts(), RequestKind::Query);
        let first = route(&state, "same message");
        let second = route(&state, "same message");
        assert_eq!(first, second);
    }
}
