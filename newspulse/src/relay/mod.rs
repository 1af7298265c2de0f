//! Chat relay: forwards a chat conversation to an OpenAI-compatible
//! completion endpoint and hands the streamed answer back untouched.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use common::ChatSettings;

pub mod sse;
pub mod stream;

pub use stream::{forward_verbatim, RelayStream};

const PERSONA_PREAMBLE: &str = "You are an intelligent news assistant for NewsPulse, a real-time financial and news media dashboard. \
You help users understand news articles, provide context, analyze trends, and answer questions about current events.";

const CLOSING_GUIDANCE: &str =
    "Keep responses concise, informative, and focused on news analysis. Cite sources when appropriate.";

/// Roles accepted from callers; anything else fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One turn of the conversation, in the upstream wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

/// Article the UI sends along to ground the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextArticle {
    pub title: String,
    pub category: String,
    pub coverage: f64,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    #[serde(default)]
    pub news_context: Option<Vec<ContextArticle>>,
}

#[derive(Debug, Error)]
pub enum RelayError {
    /// No API key was available; raised before any network call.
    #[error("AI service is not configured. Please set {env_var} in your environment variables.")]
    NotConfigured { env_var: String },

    #[error("upstream chat API returned status {status}")]
    Upstream { status: u16 },

    #[error("upstream chat API did not answer within {0:?}")]
    Timeout(Duration),

    #[error("upstream chat request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Builds the system instruction. The context section is only present when
/// at least one article was supplied.
pub fn system_prompt(context: &[ContextArticle]) -> String {
    let mut prompt = String::from(PERSONA_PREAMBLE);
    prompt.push_str("\n\n");

    if !context.is_empty() {
        prompt.push_str("Current news context:\n");
        let lines: Vec<String> = context
            .iter()
            .map(|a| format!("- {} ({}, {}% coverage)", a.title, a.category, a.coverage))
            .collect();
        prompt.push_str(&lines.join("\n"));
        prompt.push_str("\n\n");
    }

    prompt.push_str(CLOSING_GUIDANCE);
    prompt
}

/// The caller's turns with the system instruction prepended.
pub fn with_system_prompt(request: ChatRequest) -> Vec<ChatTurn> {
    let context = request.news_context.unwrap_or_default();
    let mut turns = Vec::with_capacity(request.messages.len() + 1);
    turns.push(ChatTurn::new(ChatRole::System, system_prompt(&context)));
    turns.extend(request.messages);
    turns
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn>,
    temperature: f32,
    stream: bool,
    max_tokens: usize,
}

/// Streaming proxy to the upstream chat-completion API.
pub struct ChatRelay {
    api_url: String,
    api_key: Option<String>,
    api_key_env: String,
    model: String,
    timeout: Duration,
    max_tokens: usize,
    temperature: f32,
    client: reqwest::Client,
}

impl ChatRelay {
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_key_env: common::DEFAULT_CHAT_API_KEY_ENV.to_string(),
            model: model.into(),
            timeout: Duration::from_secs(30),
            max_tokens: 500,
            temperature: 0.7,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_defaults(
        mut self,
        timeout_secs: u64,
        max_tokens: usize,
        temperature: f32,
    ) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Name of the environment variable mentioned in configuration errors.
    pub fn with_key_env(mut self, env_var: impl Into<String>) -> Self {
        self.api_key_env = env_var.into();
        self
    }

    /// Build from resolved settings, reading the API key from the configured env var.
    pub fn from_settings(settings: &ChatSettings) -> Self {
        let api_key = std::env::var(&settings.api_key_env).ok();
        if api_key.is_none() {
            warn!(env_var = %settings.api_key_env, "chat relay: API key env var not set, chat requests will be rejected");
        }
        Self::new(&settings.api_url, api_key, &settings.model)
            .with_defaults(settings.timeout.as_secs(), settings.max_tokens, settings.temperature)
            .with_key_env(&settings.api_key_env)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends the conversation upstream and returns the raw response stream.
    ///
    /// The timeout covers the wait for the upstream status line; the body then
    /// streams for as long as upstream keeps it open.
    pub async fn open_stream(&self, request: ChatRequest) -> Result<RelayStream, RelayError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| RelayError::NotConfigured {
            env_var: self.api_key_env.clone(),
        })?;

        let body = CompletionRequest {
            model: &self.model,
            messages: with_system_prompt(request),
            temperature: self.temperature,
            stream: true,
            max_tokens: self.max_tokens,
        };
        debug!(turns = body.messages.len(), model = %self.model, "chat relay: forwarding conversation");

        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .post(&self.api_url)
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send(),
        )
        .await
        .map_err(|_| RelayError::Timeout(self.timeout))??;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "chat relay: upstream API error");
            return Err(RelayError::Upstream { status: status.as_u16() });
        }

        Ok(forward_verbatim(response.bytes_stream()))
    }
}
