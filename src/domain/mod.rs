//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `conversation` - Conversation record, funnel step, status and messages
//! - `funnel` - Per-turn funnel state machine and its helpers

pub mod conversation;
pub mod foundation;
pub mod funnel;
