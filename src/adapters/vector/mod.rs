//! Vector index adapters.
//!
//! - `PineconeIndex` - Hosted index, created on first connect
//! - `InMemoryVectorIndex` - Process-local cosine search
//! - `ReasonSeeder` - Loads the example reasons into either

mod in_memory_index;
mod pinecone_index;
mod seeder;

pub use in_memory_index::{cosine_similarity, InMemoryVectorIndex};
pub use pinecone_index::{PineconeConfig, PineconeIndex};
pub use seeder::{ReasonSeeder, SeedError};
