//! Pipeline controller: sequences the stage nodes for one order.
//!
//! Invariants enforced here:
//! - stages run strictly in the fixed order for the request kind;
//! - a stage whose output is already populated is skipped (re-entry
//!   after a crash or admin retry is idempotent);
//! - a stage failure aborts the remaining pipeline for this invocation
//!   and surfaces a typed [`StageFailure`]; there is no automatic
//!   retry here, recovery is an explicit external trigger;
//! - every stage call is bounded by the configured timeout.

use std::time::Duration;

use ad_domain::conversation::ConversationState;
use ad_domain::error::Result;

use crate::stage::{sequence, Stage, StageFailure};
use crate::{stages, Capabilities};

pub struct PipelineController {
    caps: Capabilities,
    stage_timeout: Duration,
}

impl PipelineController {
    pub fn new(caps: Capabilities, stage_timeout: Duration) -> Self {
        Self {
            caps,
            stage_timeout,
        }
    }

    /// Run all unsatisfied stages in order, then mark the analysis
    /// complete. On failure the state keeps every field produced so
    /// far, and the caller persists it so a retry resumes, not restarts.
    pub async fn run(
        &self,
        state: &mut ConversationState,
    ) -> std::result::Result<(), StageFailure> {
        for &stage in sequence(state.request_kind) {
            if stage.is_satisfied(state) {
                tracing::debug!(%stage, "output present, skipping");
                continue;
            }

            tracing::info!(%stage, kind = %state.request_kind, "running stage");
            match tokio::time::timeout(self.stage_timeout, run_stage(stage, state, &self.caps))
                .await
            {
                Err(_elapsed) => {
                    tracing::warn!(%stage, timeout_sec = self.stage_timeout.as_secs(), "stage timed out");
                    return Err(StageFailure::timeout(stage));
                }
                Ok(Err(err)) => {
                    tracing::warn!(%stage, error = %err, "stage failed");
                    return Err(StageFailure::from_error(stage, &err));
                }
                Ok(Ok(())) => {}
            }
        }

        state.mark_complete();
        tracing::info!(kind = %state.request_kind, "analysis complete");
        Ok(())
    }
}

async fn run_stage(
    stage: Stage,
    state: &mut ConversationState,
    caps: &Capabilities,
) -> Result<()> {
    match stage {
        Stage::Location => stages::location::run(state, caps).await,
        Stage::Chart => stages::chart::run(state, caps).await,
        Stage::Dasha => stages::dasha::run(state, caps).await,
        Stage::GoalAnalysis => stages::goals::run(state, caps).await,
        Stage::Recommendation => stages::recommend::run(state, caps).await,
        Stage::Summarizer => stages::summarize::run(state, caps).await,
        Stage::Chat => stages::chat::answer_pending(state, caps).await.map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        facts, fresh_state, CannedLlm, CountingCharts, CountingGeocoder,
    };
    use ad_domain::conversation::{RequestKind, Role};
    use std::sync::Arc;

    fn harness() -> (
        PipelineController,
        Arc<CannedLlm>,
        Arc<CountingGeocoder>,
        Arc<CountingCharts>,
    ) {
        let llm = Arc::new(CannedLlm::default());
        let geocoder = Arc::new(CountingGeocoder::default());
        let charts = Arc::new(CountingCharts::default());
        let controller = PipelineController::new(
            Capabilities {
                llm: llm.clone(),
                geocoder: geocoder.clone(),
                charts: charts.clone(),
            },
            Duration::from_secs(5),
        );
        (controller, llm, geocoder, charts)
    }

    #[tokio::test]
    async fn full_report_runs_stages_in_order() {
        let (controller, llm, geocoder, charts) = harness();
        let mut state = fresh_state(RequestKind::FullReport);

        controller.run(&mut state).await.unwrap();

        assert!(state.analysis_complete);
        assert!(state.location.is_some());
        assert!(state.chart_data.is_some());
        assert!(state.dasha_data.is_some());
        assert!(state.goal_analysis.is_some());
        assert!(state.recommendations.is_some());
        assert!(state.summary.is_some());
        assert_eq!(geocoder.calls(), 1);
        assert_eq!(charts.calls(), 1);

        // Five LLM-backed stages, invoked in pipeline order.
        let systems: Vec<String> = llm.requests().iter().map(|r| r.system.clone()).collect();
        assert_eq!(systems.len(), 5);
        assert!(systems[0].contains("chart analyst"));
        assert!(systems[1].contains("Vimshottari"));
        assert!(systems[2].contains("life areas"));
        assert!(systems[3].contains("recommendations"));
        assert!(systems[4].contains("summarizing"));
    }

    #[tokio::test]
    async fn failure_aborts_remaining_stages() {
        let (controller, llm, _, _) = harness();
        llm.fail_when_system_contains("Vimshottari");
        let mut state = fresh_state(RequestKind::FullReport);

        let failure = controller.run(&mut state).await.unwrap_err();

        assert_eq!(failure.stage, Stage::Dasha);
        assert_eq!(failure.reason(), "dasha: llm_error");
        // Upstream fields survive, downstream were never attempted.
        assert!(state.chart_data.is_some());
        assert!(state.dasha_data.is_none());
        assert!(state.goal_analysis.is_none());
        assert!(state.summary.is_none());
        assert!(!state.analysis_complete);
    }

    #[tokio::test]
    async fn dasha_never_set_before_chart() {
        // Break the chart formatting call; nothing downstream may run.
        let (controller, llm, _, _) = harness();
        llm.fail_when_system_contains("chart analyst");
        let mut state = fresh_state(RequestKind::FullReport);

        let failure = controller.run(&mut state).await.unwrap_err();

        assert_eq!(failure.stage, Stage::Chart);
        assert!(state.chart_data.is_none());
        assert!(state.dasha_data.is_none());
    }

    #[tokio::test]
    async fn rerun_skips_satisfied_stages_and_preserves_chart() {
        let (controller, _, geocoder, charts) = harness();
        let mut state = fresh_state(RequestKind::FullReport);
        controller.run(&mut state).await.unwrap();

        let chart_before = state.chart_data.clone().unwrap();
        controller.run(&mut state).await.unwrap();

        // Nothing recomputed, chart value untouched.
        assert_eq!(geocoder.calls(), 1);
        assert_eq!(charts.calls(), 1);
        assert_eq!(
            serde_json::to_string(&state.chart_data.as_ref().unwrap().raw).unwrap(),
            serde_json::to_string(&chart_before.raw).unwrap(),
        );
    }

    #[tokio::test]
    async fn retry_after_failure_resumes_from_failed_stage() {
        let (controller, llm, geocoder, charts) = harness();
        llm.fail_when_system_contains("Vimshottari");
        let mut state = fresh_state(RequestKind::FullReport);
        assert!(controller.run(&mut state).await.is_err());

        llm.clear_failure();
        controller.run(&mut state).await.unwrap();

        // Location and chart ran exactly once across both invocations.
        assert_eq!(geocoder.calls(), 1);
        assert_eq!(charts.calls(), 1);
        assert!(state.analysis_complete);
    }

    #[tokio::test]
    async fn query_pipeline_answers_the_initiating_question() {
        let (controller, _, _, charts) = harness();
        let mut state = fresh_state(RequestKind::Query);
        state.push_message(Role::User, "will I change jobs next year?");

        controller.run(&mut state).await.unwrap();

        assert!(state.analysis_complete);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].role, Role::Assistant);
        assert_eq!(charts.calls(), 1);
        // Query orders never run the report-only stages.
        assert!(state.goal_analysis.is_none());
        assert!(state.recommendations.is_none());
        assert!(state.summary.is_none());
    }

    #[tokio::test]
    async fn stage_timeout_is_a_stage_failure() {
        let llm = Arc::new(CannedLlm::default());
        let geocoder = Arc::new(CountingGeocoder::with_delay(200));
        let controller = PipelineController::new(
            Capabilities {
                llm,
                geocoder: geocoder.clone(),
                charts: Arc::new(CountingCharts::default()),
            },
            Duration::from_millis(20),
        );
        let mut state = fresh_state(RequestKind::FullReport);

        let failure = controller.run(&mut state).await.unwrap_err();
        assert_eq!(failure.reason(), "location: timeout");
        assert!(state.location.is_none());
    }

    #[tokio::test]
    async fn facts_builder_is_complete() {
        assert!(facts().validate().is_ok());
    }
}
