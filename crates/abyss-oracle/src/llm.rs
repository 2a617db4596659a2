//! LLM backend abstraction and implementations.
//!
//! Enum dispatch instead of trait objects, because async methods are not
//! dyn-compatible. The HTTP backends speak the `OpenAI` chat completions and
//! Anthropic Messages formats over `reqwest`. The scripted backend replays
//! canned responses without touching the network.
//!
//! A backend only produces text. Turning that text into a decision is the
//! job of [`crate::parse`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::config::{BackendType, OracleConfig};
use crate::error::OracleError;

/// One prompt as sent to a backend.
#[derive(Debug, Clone, Copy)]
pub struct OraclePrompt<'a> {
    /// Standing instructions.
    pub system: &'a str,
    /// The situational prompt.
    pub user: &'a str,
}

/// Sampling parameters shared by both HTTP backends.
#[derive(Debug, Clone, Copy)]
struct Sampling {
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
}

impl Sampling {
    const fn from_config(config: &OracleConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
        }
    }
}

// ---------------------------------------------------------------------------
// Unified backend enum
// ---------------------------------------------------------------------------

/// An oracle backend that turns a prompt into raw response text.
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
    /// Canned offline responses.
    Scripted(ScriptedBackend),
}

impl LlmBackend {
    /// Send a prompt and return the response text.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] if the HTTP call fails or the response
    /// cannot be extracted.
    pub async fn complete(&self, prompt: OraclePrompt<'_>) -> Result<String, OracleError> {
        match self {
            Self::OpenAi(backend) => backend.complete(prompt).await,
            Self::Anthropic(backend) => backend.complete(prompt).await,
            Self::Scripted(backend) => Ok(backend.complete().await),
        }
    }

    /// Human-readable name for logging and diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
            Self::Scripted(_) => "scripted",
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Sends requests to `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    sampling: Sampling,
}

impl OpenAiBackend {
    /// Create a new `OpenAI`-compatible backend.
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            sampling: Sampling::from_config(config),
        }
    }

    async fn complete(&self, prompt: OraclePrompt<'_>) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.api_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": self.sampling.temperature,
            "max_tokens": self.sampling.max_tokens,
            "top_p": self.sampling.top_p
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let json = read_success_json(response).await?;
        extract_openai_content(&json)
    }
}

/// Extract the text content from an `OpenAI` chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, OracleError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or(OracleError::MissingContent("choices[0].message.content"))
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API.
///
/// Differs from `OpenAI` in three ways: the key goes in `x-api-key`, the
/// system prompt is a top-level field, and the text lives at
/// `content[0].text`.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    sampling: Sampling,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            sampling: Sampling::from_config(config),
        }
    }

    async fn complete(&self, prompt: OraclePrompt<'_>) -> Result<String, OracleError> {
        let url = format!("{}/messages", self.api_url);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.sampling.max_tokens,
            "temperature": self.sampling.temperature,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user}
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?;

        let json = read_success_json(response).await?;
        extract_anthropic_content(&json)
    }
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &serde_json::Value) -> Result<String, OracleError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or(OracleError::MissingContent("content[0].text"))
}

/// Fail on a non-success status, otherwise decode the body as JSON.
async fn read_success_json(response: reqwest::Response) -> Result<serde_json::Value, OracleError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(OracleError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

// ---------------------------------------------------------------------------
// Scripted backend
// ---------------------------------------------------------------------------

/// Responses the scripted backend cycles through by default. They cover a
/// clean answer, a fenced one, a broken one, and one with an unknown
/// intention, so offline runs exercise every recovery path.
const DEFAULT_SCRIPT: [&str; 6] = [
    r#"{"intention":"hunt","internal_monologue":"I must find food or die","public_message":"...","move_direction":{"x":1,"y":0}}"#,
    r#"{"intention":"attack","internal_monologue":"I will steal from them","public_message":"Hello friend!","move_direction":{"x":0,"y":1}}"#,
    "```json\n{\"intention\":\"socialize\",\"internal_monologue\":\"They look hungry\",\"public_message\":\"Take some of mine\",\"move_direction\":{\"x\":-0.5,\"y\":0.5},}\n```",
    r#"{"intention":"flee","internal_monologue":"Too many strangers","public_message":"Stay there, friend","move_direction":{"x":-1,"y":-1}}"#,
    r#"intention: "hunt", internal_monologue: "Hungry again" and then I"#,
    r#"{"intention":"dance","internal_monologue":"","move_direction":"north"}"#,
];

/// Replays a fixed list of raw responses in order, wrapping around.
pub struct ScriptedBackend {
    responses: Vec<String>,
    cursor: AtomicUsize,
    latency: Duration,
}

impl ScriptedBackend {
    /// Create a scripted backend. An empty list falls back to the built-in
    /// script.
    pub fn new(responses: Vec<String>, latency: Duration) -> Self {
        let responses = if responses.is_empty() {
            DEFAULT_SCRIPT.iter().map(|s| (*s).to_owned()).collect()
        } else {
            responses
        };
        Self {
            responses,
            cursor: AtomicUsize::new(0),
            latency,
        }
    }

    async fn complete(&self) -> String {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let turn = self.cursor.fetch_add(1, Ordering::Relaxed);
        let index = turn.checked_rem(self.responses.len()).unwrap_or(0);
        self.responses.get(index).cloned().unwrap_or_default()
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new(Vec::new(), Duration::from_millis(250))
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create a backend from configuration. `Disabled` yields `None`.
pub fn create_backend(config: &OracleConfig) -> Option<LlmBackend> {
    match config.backend_type {
        BackendType::OpenAi => Some(LlmBackend::OpenAi(OpenAiBackend::new(config))),
        BackendType::Anthropic => Some(LlmBackend::Anthropic(AnthropicBackend::new(config))),
        BackendType::Scripted => Some(LlmBackend::Scripted(ScriptedBackend::default())),
        BackendType::Disabled => None,
    }
}
