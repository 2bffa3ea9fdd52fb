//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod funnel;

pub use funnel::{
    // Commands
    HandleInboundCommand, HandleInboundError, HandleInboundHandler, HandleInboundResult,
    // Queries
    ConversationStatusView, GetConversationStatusError, GetConversationStatusHandler,
    GetConversationStatusQuery, LeadStatus,
};
