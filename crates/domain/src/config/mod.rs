mod capabilities;
mod llm;
mod observability;
mod pipeline;
mod quota;
mod server;

pub use capabilities::*;
pub use llm::*;
pub use observability::*;
pub use pipeline::*;
pub use quota::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Directory for persisted state (`orders.json` lives here).
    #[serde(default = "d_state_path")]
    pub state_path: PathBuf,
}

fn d_state_path() -> PathBuf {
    PathBuf::from("./data")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Config {
    /// Check the config for problems that would bite at runtime.
    /// Errors block startup; warnings are logged and tolerated.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.pipeline.stage_timeout_sec == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                message: "pipeline.stage_timeout_sec must be greater than zero".into(),
            });
        }
        if self.quota.max_user_messages == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                message: "quota.max_user_messages must be greater than zero".into(),
            });
        }
        if std::env::var(&self.llm.api_key_env)
            .map(|v| v.is_empty())
            .unwrap_or(true)
        {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                message: format!(
                    "LLM API key env var {} is unset; analysis stages will fail",
                    self.llm.api_key_env
                ),
            });
        }
        if std::env::var(&self.payments.webhook_secret_env)
            .map(|v| v.is_empty())
            .unwrap_or(true)
        {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                message: format!(
                    "payment webhook secret env var {} is unset; webhook signatures \
                     cannot be verified",
                    self.payments.webhook_secret_env
                ),
            });
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_parses_with_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.server.port, 8470);
        assert_eq!(cfg.quota.max_user_messages, 3);
        assert_eq!(cfg.pipeline.stage_timeout_sec, 120);
        assert_eq!(cfg.state_path, PathBuf::from("./data"));
    }

    #[test]
    fn zero_stage_timeout_is_an_error() {
        let cfg: Config = toml::from_str("[pipeline]\nstage_timeout_sec = 0\n").unwrap();
        let issues = cfg.validate();
        assert!(issues
            .iter()
            .any(|i| i.severity == ConfigSeverity::Error
                && i.message.contains("stage_timeout_sec")));
    }
}
