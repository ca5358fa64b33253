//! Model client abstraction for chat-completion backends.
//!
//! The [`ModelClient`] trait decouples step generation from the actual
//! backend (an OpenAI-compatible chat-completion endpoint). Tests use
//! scripted clients that return predetermined responses without network
//! access. Calls are blocking: the harness is strictly sequential and the
//! model invocation is its one suspension point.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wall-clock ceiling for a single completion request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Sampling configuration for one completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    /// Sampling temperature, passed through uniformly.
    pub temperature: f64,
    /// Completion token ceiling; `None` leaves the backend default in place.
    pub max_tokens: Option<u32>,
}

impl ModelParams {
    /// Resolve request parameters for a model identifier.
    ///
    /// Claude-family models require an explicit completion budget; other
    /// backends use their server-side default.
    pub fn for_model(model: &str, temperature: f64) -> Self {
        let max_tokens = model.contains("claude").then_some(4096);
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Abstraction over completion backends.
pub trait ModelClient {
    /// Send a prompt and return the raw response text.
    fn complete(&self, prompt: &str, params: &ModelParams) -> Result<String>;
}

/// Client for OpenAI-compatible chat-completion endpoints.
#[derive(Debug)]
pub struct HttpModelClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpModelClient {
    /// Create a client for the given model and endpoint.
    pub fn new(model: String, base_url: String, api_key: String) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }

    /// Create a client reading the API key from the named environment variable.
    pub fn from_env(model: String, base_url: String, api_key_env: &str) -> Result<Self> {
        let api_key = std::env::var(api_key_env)
            .map_err(|_| anyhow!("API key not found in environment variable {api_key_env}"))?;
        Self::new(model, base_url, api_key)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl ModelClient for HttpModelClient {
    fn complete(&self, prompt: &str, params: &ModelParams) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        debug!(model = %self.model, prompt_bytes = prompt.len(), "sending completion request");
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("send completion request")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            bail!("completion request failed with status {}: {}", status, detail.trim());
        }

        let parsed: ChatResponse = response.json().context("parse completion response")?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("completion response has no choices"))?;
        Ok(choice.message.content)
    }
}
