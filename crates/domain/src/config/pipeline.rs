use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound on a single stage's wall-clock time. A stage that
    /// exceeds it is treated as a stage failure.
    #[serde(default = "d_stage_timeout")]
    pub stage_timeout_sec: u64,
    /// Orders stuck in `processing` longer than this are surfaced to
    /// operators as stale (and become retriggerable).
    #[serde(default = "d_stale_ceiling")]
    pub stale_processing_ceiling_min: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_timeout_sec: d_stage_timeout(),
            stale_processing_ceiling_min: d_stale_ceiling(),
        }
    }
}

fn d_stage_timeout() -> u64 {
    120
}
fn d_stale_ceiling() -> u64 {
    30
}
