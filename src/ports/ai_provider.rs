//! Chat-completion port.
//!
//! Reply rendering turns a funnel step into a prompt and hands it to an
//! [`AIProvider`]. Calls are single attempts; the funnel owns the fallback
//! text when one fails.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait AIProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    fn provider_info(&self) -> ProviderInfo;
}

/// One chat-completion call: optional system prompt followed by `messages`.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system_prompt: Option<String>,
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
    /// Sent as `max_completion_tokens`.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Text of the first choice. Can be empty; callers decide what that means.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
}

impl CompletionResponse {
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Failures shared by completion and embedding calls.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    #[error("rate limited by provider, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    #[error("provider rejected the API key")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    /// Body did not match the expected shape.
    #[error("unexpected provider response: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no response within {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl AIError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
