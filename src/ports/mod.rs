//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the funnel and the outside world. Adapters implement these ports.
//!
//! ## Persistence
//!
//! - `ConversationRepository` - Conversation records and message log
//!
//! ## AI
//!
//! - `AIProvider` - Chat completions
//! - `ReplyGenerator` - Step-aware reply rendering
//! - `EmbeddingProvider` - Text embeddings
//! - `VectorIndex` - Nearest-neighbour search over example reasons

mod ai_provider;
mod conversation_repository;
mod embedding_provider;
mod reply_generator;
mod vector_index;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, Message, MessageRole, ProviderInfo,
};
pub use conversation_repository::ConversationRepository;
pub use embedding_provider::EmbeddingProvider;
pub use reply_generator::ReplyGenerator;
pub use vector_index::{IndexedVector, NearestMatch, ReasonMetadata, VectorIndex, VectorIndexError};
