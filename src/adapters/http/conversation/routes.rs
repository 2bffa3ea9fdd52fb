//! Axum routes for conversation endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{get_status, send_message, ConversationAppState};

/// Creates routes for conversation endpoints.
///
/// - POST /conversations/:phone_number/messages - Process an inbound message
/// - GET /conversations/:phone_number/status - Funnel snapshot
pub fn conversation_routes() -> Router<ConversationAppState> {
    Router::new()
        .route("/conversations/:phone_number/messages", post(send_message))
        .route("/conversations/:phone_number/status", get(get_status))
}
