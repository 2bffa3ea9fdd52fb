//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// OpenAI configuration for reply generation and embeddings
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model used to render replies
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model used by the classifier and the seeder
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Sampling temperature for replies
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token cap for replies
    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_openai() {
            return Err(ValidationError::MissingRequired("OPENAI_API_KEY"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("ai.base_url"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            max_completion_tokens: default_max_completion_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4.1-nano".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_completion_tokens() -> u32 {
    150
}

fn default_timeout() -> u64 {
    60
}
