//! Conversation domain module.
//!
//! The lead's conversation record, its funnel position and lifecycle status,
//! the message log entries and the per-turn state update.

mod conversation;
mod funnel_step;
mod message;
mod state_update;
mod status;

pub use conversation::{CollectedFields, Conversation, ReplyContext};
pub use funnel_step::FunnelStep;
pub use message::{Message, Role};
pub use state_update::StateUpdate;
pub use status::ConversationStatus;
