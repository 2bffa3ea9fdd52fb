//! AI Provider Adapters.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - OpenAI chat completions and embeddings
//! - `MockAIProvider` - Configurable mock for testing
//! - `PromptReplyGenerator` - Step-aware reply rendering on top of any `AIProvider`

mod mock_provider;
mod openai_provider;
mod prompt_reply_generator;

pub use mock_provider::{MockAIProvider, MockError, MOCK_EMBEDDING_DIMENSION};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
pub use prompt_reply_generator::{conversation_context, system_prompt, PromptReplyGenerator};
