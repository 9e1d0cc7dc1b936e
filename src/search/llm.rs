//! Text-generation capability behind the LLM tiers.
//!
//! The whole pipeline is synchronous, so the client is a plain blocking HTTP
//! call with a single attempt: a failure routes the caller to its
//! deterministic tier instead of retrying.

use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Prompt-in, text-out capability. Optional everywhere it is consumed.
pub trait LlmClient: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build();
        Self {
            agent,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// Probe the environment once; `None` means the LLM tier is unavailable,
    /// which is expected and not an error.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())?;
        let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(api_key, base_url, model))
    }
}

impl LlmClient for OpenAiClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": 256,
            "temperature": 0.2,
        });

        let response = self
            .agent
            .post(&format!("{}/chat/completions", self.base_url))
            .set("authorization", &format!("Bearer {}", self.api_key))
            .set("content-type", "application/json")
            .send_json(payload)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => {
                    let body = resp.into_string().unwrap_or_default();
                    anyhow!("chat completion API returned {code}: {body}")
                }
                ureq::Error::Transport(t) => anyhow!("chat completion request failed: {t}"),
            })?;

        let body: serde_json::Value = response
            .into_json()
            .context("chat completion response was not valid JSON")?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("chat completion response missing message content"))?;

        Ok(content.trim().to_string())
    }
}
