//! Stage identities, per-kind sequences, and the skip-if-present rule.

use ad_domain::conversation::{ConversationState, RequestKind, Role};
use ad_domain::error::Error;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Stage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Location,
    Chart,
    Dasha,
    GoalAnalysis,
    Recommendation,
    Summarizer,
    Chat,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Chart => "chart",
            Self::Dasha => "dasha",
            Self::GoalAnalysis => "goal_analysis",
            Self::Recommendation => "recommendation",
            Self::Summarizer => "summarizer",
            Self::Chat => "chat",
        }
    }

    /// Skip-if-present: whether this stage's output field is already
    /// populated, meaning re-entry must not re-invoke it.
    pub fn is_satisfied(self, state: &ConversationState) -> bool {
        match self {
            Self::Location => state.location.is_some(),
            Self::Chart => state.chart_data.is_some(),
            Self::Dasha => state.dasha_data.is_some(),
            Self::GoalAnalysis => state.goal_analysis.is_some(),
            Self::Recommendation => state.recommendations.is_some(),
            Self::Summarizer => state.summary.is_some(),
            // The terminal chat of a query order is satisfied once the
            // initiating question has an assistant reply.
            Self::Chat => state.messages.iter().any(|m| m.role == Role::Assistant),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The fixed stage order for each request kind. Topology never
/// branches; re-entry resumes by skipping satisfied stages.
pub fn sequence(kind: RequestKind) -> &'static [Stage] {
    match kind {
        RequestKind::FullReport => &[
            Stage::Location,
            Stage::Chart,
            Stage::Dasha,
            Stage::GoalAnalysis,
            Stage::Recommendation,
            Stage::Summarizer,
        ],
        RequestKind::Query => &[Stage::Location, Stage::Chart, Stage::Dasha, Stage::Chat],
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Stage failure
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A stage-level failure, translated at the controller boundary into an
/// order-level `error_reason`.
#[derive(Debug, Clone)]
pub struct StageFailure {
    pub stage: Stage,
    pub category: &'static str,
}

impl StageFailure {
    pub fn timeout(stage: Stage) -> Self {
        Self {
            stage,
            category: "timeout",
        }
    }

    pub fn from_error(stage: Stage, err: &Error) -> Self {
        let category = match err {
            Error::Capability { capability, .. } => match *capability {
                "llm" => "llm_error",
                "geocoding" => "geocoding_error",
                "chart" => "chart_error",
                other => {
                    tracing::warn!(capability = other, "unmapped capability failure");
                    "capability_error"
                }
            },
            Error::NotFound(_) => "place_not_found",
            Error::Validation(_) => "invalid_input",
            _ => "internal_error",
        };
        Self { stage, category }
    }

    /// The stable machine-readable reason recorded on the failed order.
    pub fn reason(&self) -> String {
        format!("{}: {}", self.stage.name(), self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_report_ends_with_summarizer() {
        let seq = sequence(RequestKind::FullReport);
        assert_eq!(seq.first(), Some(&Stage::Location));
        assert_eq!(seq.last(), Some(&Stage::Summarizer));
        assert_eq!(seq.len(), 6);
    }

    #[test]
    fn query_ends_with_chat() {
        let seq = sequence(RequestKind::Query);
        assert_eq!(seq, &[Stage::Location, Stage::Chart, Stage::Dasha, Stage::Chat]);
    }

    #[test]
    fn failure_reason_names_stage_and_category() {
        let err = Error::Capability {
            capability: "llm",
            message: "503 from upstream".into(),
        };
        let failure = StageFailure::from_error(Stage::Dasha, &err);
        assert_eq!(failure.reason(), "dasha: llm_error");
        // Internal diagnostics never leak into the reason string.
        assert!(!failure.reason().contains("503"));
    }

    #[test]
    fn timeout_reason() {
        assert_eq!(StageFailure::timeout(Stage::Chart).reason(), "chart: timeout");
    }
}
