//! Scripted stand-in for OpenAI.
//!
//! Completions are served from a queue and fall back to `"Mock response"`
//! once it runs dry. Embeddings are either pinned per text or derived from
//! the text bytes, so the same input always yields the same vector.
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response("Prazer, Maria! Qual é a sua data de nascimento?")
//!     .with_embedding("Tenho diabetes", vec![1.0, 0.0]);
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, EmbeddingProvider, ProviderInfo,
};

/// Length of derived embeddings.
pub const MOCK_EMBEDDING_DIMENSION: usize = 8;

const DEFAULT_COMPLETION: &str = "Mock response";

/// Failures the mock can be told to produce.
#[derive(Debug, Clone)]
pub enum MockError {
    Unavailable { message: String },
    AuthenticationFailed,
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    completions: VecDeque<Result<String, MockError>>,
    embeddings: HashMap<String, Vec<f32>>,
    embedding_error: Option<MockError>,
    completion_calls: Vec<CompletionRequest>,
    embedded_texts: Vec<String>,
}

/// Clones share the same script and call log.
#[derive(Debug, Clone, Default)]
pub struct MockAIProvider {
    script: Arc<Mutex<Script>>,
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.script().completions.push_back(Ok(content.into()));
        self
    }

    pub fn with_error(self, error: MockError) -> Self {
        self.script().completions.push_back(Err(error));
        self
    }

    pub fn with_embedding(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.script().embeddings.insert(text.into(), vector);
        self
    }

    /// Every `embed` call fails with `error`.
    pub fn with_embedding_error(self, error: MockError) -> Self {
        self.script().embedding_error = Some(error);
        self
    }

    pub fn call_count(&self) -> usize {
        self.script().completion_calls.len()
    }

    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.script().completion_calls.clone()
    }

    pub fn embedded_texts(&self) -> Vec<String> {
        self.script().embedded_texts.clone()
    }
}

fn derived_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; MOCK_EMBEDDING_DIMENSION];
    for (i, byte) in text.bytes().enumerate() {
        vector[i % MOCK_EMBEDDING_DIMENSION] += f32::from(byte) / 255.0;
    }
    vector
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let mut script = self.script();
        script.completion_calls.push(request);
        let next = script
            .completions
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_COMPLETION.to_string()));

        next.map(|content| CompletionResponse::new(content, "mock-model-1"))
            .map_err(AIError::from)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model-1")
    }
}

#[async_trait]
impl EmbeddingProvider for MockAIProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AIError> {
        let mut script = self.script();
        script.embedded_texts.push(text.to_string());

        if let Some(err) = script.embedding_error.clone() {
            return Err(err.into());
        }
        Ok(script
            .embeddings
            .get(text)
            .cloned()
            .unwrap_or_else(|| derived_embedding(text)))
    }
}
