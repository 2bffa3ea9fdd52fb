//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - OpenAI chat and embeddings, prompt rendering, mocks
//! - `vector` - Pinecone and in-memory vector indexes, example seeding
//! - `postgres` - PostgreSQL conversation repository
//! - `storage` - In-memory conversation repository
//! - `http` - Axum REST API

pub mod ai;
pub mod http;
pub mod postgres;
pub mod storage;
pub mod vector;

pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider, PromptReplyGenerator};
pub use http::{app_router, ConversationAppState};
pub use postgres::PostgresConversationRepository;
pub use storage::InMemoryConversationRepository;
pub use vector::{InMemoryVectorIndex, PineconeConfig, PineconeIndex, ReasonSeeder};
