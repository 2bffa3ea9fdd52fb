//! HTTP adapter for conversation endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{
    ConversationStatusResponse, ConversationView, ErrorResponse, MessageResponse,
    SendMessageRequest, VariablesView,
};
pub use handlers::{ConversationApiError, ConversationAppState};
pub use routes::conversation_routes;
