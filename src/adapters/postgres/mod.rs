//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresConversationRepository` - Conversations and their message log

mod conversation_repository;

pub use conversation_repository::PostgresConversationRepository;
