//! Minimal chat client for an OpenAI-compatible completions endpoint.
//!
//! Configuration is handed in explicitly; this crate never reads the
//! environment. An unconfigured client (no API key) is a valid state: the
//! advisor then stays on its deterministic path.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the narration model.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key; `None` disables the client.
    pub api_key: Option<String>,
    pub model: String,
    /// Base URL up to and including the version segment, e.g.
    /// `https://api.openai.com/v1`.
    pub base_url: String,
}

/// Chat client over HTTP. Cheap to clone; the inner reqwest client pools
/// connections.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> LlmClient {
        LlmClient {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// True when an API key is present and calls can be attempted.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Single-turn chat call; returns the assistant's text, trimmed.
    pub async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow!("LLM client is not configured (no API key)"))?;

        let endpoint = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature: 0.2,
            max_tokens: 900,
        };

        let response: ChatResponse = self
            .http
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("POST {endpoint} failed"))?
            .error_for_status()
            .with_context(|| format!("POST {endpoint} returned non-success status"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {endpoint}"))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .ok_or_else(|| anyhow!("Chat response had no message content"))?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
}
