//! Storage Adapters
//!
//! In-process implementation of the ConversationRepository port.
//!
//! ```ignore
//! use adapters::storage::InMemoryConversationRepository;
//!
//! let repo = Arc::new(InMemoryConversationRepository::new());
//! ```

mod in_memory_conversation_repository;

pub use in_memory_conversation_repository::InMemoryConversationRepository;
