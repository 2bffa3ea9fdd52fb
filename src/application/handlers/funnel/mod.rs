//! Funnel command and query handlers.

mod get_status;
mod handle_inbound;
mod phone_locks;

pub use get_status::{
    ConversationStatusView, GetConversationStatusError, GetConversationStatusHandler,
    GetConversationStatusQuery, LeadStatus,
};
pub use handle_inbound::{
    HandleInboundCommand, HandleInboundError, HandleInboundHandler, HandleInboundResult,
};
pub use phone_locks::{PhoneGuard, PhoneLocks};
