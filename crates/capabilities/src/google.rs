//! Google Gemini adapter.
//!
//! Implements the Gemini `generateContent` API. Auth is via an API key
//! passed as a query parameter (`key={api_key}`).

use serde_json::Value;

use ad_domain::config::LlmConfig;
use ad_domain::conversation::Role;
use ad_domain::error::{Error, Result};

use crate::traits::{LlmProvider, LlmRequest};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct GoogleLlm {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl GoogleLlm {
    /// Create the adapter from config, reading the API key from the
    /// configured env var.
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config(format!("env var {} is not set", cfg.api_key_env)))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_sec))
            .build()
            .map_err(|e| Error::Capability {
                capability: "llm",
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            client,
        })
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn build_body(&self, req: &LlmRequest) -> Value {
        let mut contents: Vec<Value> = Vec::new();
        for msg in &req.history {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            contents.push(serde_json::json!({
                "role": role,
                "parts": [{"text": msg.content}],
            }));
        }
        contents.push(serde_json::json!({
            "role": "user",
            "parts": [{"text": req.user}],
        }));

        serde_json::json!({
            "contents": contents,
            "systemInstruction": {
                "parts": [{"text": req.system}],
            },
            "generationConfig": {
                "temperature": req.temperature.unwrap_or(self.temperature),
                "maxOutputTokens": self.max_tokens,
            },
        })
    }

    fn extract_text(resp: &Value) -> Option<String> {
        let parts = resp
            .get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .as_array()?;
        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for GoogleLlm {
    async fn generate(&self, req: LlmRequest) -> Result<String> {
        let body = self.build_body(&req);
        let resp = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Capability {
                capability: "llm",
                message: e.to_string(),
            })?;

        let status = resp.status();
        let json: Value = resp.json().await.map_err(|e| Error::Capability {
            capability: "llm",
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let message = json
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(Error::Capability {
                capability: "llm",
                message: format!("HTTP {status}: {message}"),
            });
        }

        Self::extract_text(&json).ok_or_else(|| Error::Capability {
            capability: "llm",
            message: "response contained no candidate text".into(),
        })
    }

    fn provider_id(&self) -> &str {
        "google"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_domain::conversation::ChatMessage;
    use chrono::Utc;

    fn adapter() -> GoogleLlm {
        GoogleLlm {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: "test-key".into(),
            model: "gemini-2.0-flash".into(),
            temperature: 0.7,
            max_tokens: 1024,
            client: reqwest::Client::new(),
        }
    }

    #[test]
    fn url_carries_model_and_key() {
        let url = adapter().generate_url();
        assert!(url.contains("/v1beta/models/gemini-2.0-flash:generateContent"));
        assert!(url.ends_with("key=test-key"));
    }

    #[test]
    fn body_maps_history_roles() {
        let req = LlmRequest {
            system: "be terse".into(),
            history: vec![
                ChatMessage {
                    role: Role::User,
                    content: "hi".into(),
                    sequence_number: 1,
                    timestamp: Utc::now(),
                },
                ChatMessage {
                    role: Role::Assistant,
                    content: "hello".into(),
                    sequence_number: 2,
                    timestamp: Utc::now(),
                },
            ],
            user: "question".into(),
            temperature: Some(0.1),
        };
        let body = adapter().build_body(&req);
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "question");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be terse");
        assert_eq!(body["generationConfig"]["temperature"], 0.1);
    }

    #[test]
    fn extract_text_concatenates_parts() {
        let resp = serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "part one "}, {"text": "part two"}]}
            }]
        });
        assert_eq!(
            GoogleLlm::extract_text(&resp).as_deref(),
            Some("part one part two")
        );
    }

    #[test]
    fn extract_text_rejects_empty_candidates() {
        let resp = serde_json::json!({ "candidates": [] });
        assert!(GoogleLlm::extract_text(&resp).is_none());
    }
}
