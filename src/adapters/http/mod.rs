//! HTTP adapters - REST API implementations.
//!
//! - `conversation` - Inbound messages and status queries
//! - `health` - Liveness probe

pub mod conversation;
pub mod health;

use axum::Router;

pub use conversation::{conversation_routes, ConversationAppState};
pub use health::health_routes;

/// Complete application router (without middleware layers).
pub fn app_router(state: ConversationAppState) -> Router {
    Router::new()
        .merge(conversation_routes())
        .merge(health_routes())
        .with_state(state)
}
