use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuration for the LLM capability (a Gemini-compatible
/// `generateContent` endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "d_llm_base_url")]
    pub base_url: String,
    /// Env var holding the API key (passed as a query parameter).
    #[serde(default = "d_llm_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_llm_model")]
    pub model: String,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    #[serde(default = "d_max_tokens")]
    pub max_tokens: u32,
    /// Per-request HTTP timeout. Stage-level timeouts are separate and
    /// configured under `[pipeline]`.
    #[serde(default = "d_llm_timeout")]
    pub timeout_sec: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: d_llm_base_url(),
            api_key_env: d_llm_api_key_env(),
            model: d_llm_model(),
            temperature: d_temperature(),
            max_tokens: d_max_tokens(),
            timeout_sec: d_llm_timeout(),
        }
    }
}

fn d_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn d_llm_api_key_env() -> String {
    "ASTRODESK_GOOGLE_API_KEY".into()
}
fn d_llm_model() -> String {
    "gemini-2.0-flash".into()
}
fn d_temperature() -> f32 {
    0.7
}
fn d_max_tokens() -> u32 {
    8_192
}
fn d_llm_timeout() -> u64 {
    90
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_gemini() {
        let cfg = LlmConfig::default();
        assert!(cfg.base_url.contains("generativelanguage"));
        assert_eq!(cfg.model, "gemini-2.0-flash");
    }

    #[test]
    fn model_override_parses() {
        let cfg: LlmConfig = toml::from_str(r#"model = "gemini-2.5-pro""#).unwrap();
        assert_eq!(cfg.model, "gemini-2.5-pro");
        assert_eq!(cfg.timeout_sec, 90);
    }
}
