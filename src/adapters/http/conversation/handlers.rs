//! HTTP handlers for conversation endpoints.
//!
//! These handlers connect Axum routes to application layer operations.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{
    GetConversationStatusError, GetConversationStatusHandler, GetConversationStatusQuery,
    HandleInboundCommand, HandleInboundError, HandleInboundHandler,
};
use crate::domain::foundation::ErrorCode;
use crate::domain::funnel::replies;

use super::dto::{ConversationStatusResponse, ErrorResponse, MessageResponse, SendMessageRequest};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for conversation handlers.
#[derive(Clone)]
pub struct ConversationAppState {
    pub inbound: Arc<HandleInboundHandler>,
    pub status: Arc<GetConversationStatusHandler>,
}

impl ConversationAppState {
    pub fn new(inbound: Arc<HandleInboundHandler>, status: Arc<GetConversationStatusHandler>) -> Self {
        Self { inbound, status }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// POST /conversations/:phone_number/messages
// ════════════════════════════════════════════════════════════════════════════════

/// POST /conversations/:phone_number/messages - Process a lead's message.
///
/// # Errors
/// - 400 Bad Request: Empty content
/// - 410 Gone: Conversation idle past the session timeout
/// - 500 Internal Server Error: Persistence failure
pub async fn send_message(
    State(state): State<ConversationAppState>,
    Path(phone_number): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ConversationApiError> {
    let result = state
        .inbound
        .handle(HandleInboundCommand {
            phone_number,
            content: request.content,
        })
        .await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::text(result.reply, &result.conversation)),
    ))
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /conversations/:phone_number/status
// ════════════════════════════════════════════════════════════════════════════════

/// GET /conversations/:phone_number/status - Funnel snapshot.
///
/// Unknown numbers answer 200 with status `not_found`.
pub async fn get_status(
    State(state): State<ConversationAppState>,
    Path(phone_number): Path<String>,
) -> Result<impl IntoResponse, ConversationApiError> {
    let view = state
        .status
        .handle(GetConversationStatusQuery { phone_number })
        .await?;

    Ok((StatusCode::OK, Json(ConversationStatusResponse::from(view))))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub enum ConversationApiError {
    BadRequest(String),
    Expired,
    Internal(String),
}

impl From<HandleInboundError> for ConversationApiError {
    fn from(err: HandleInboundError) -> Self {
        match err {
            HandleInboundError::Expired { .. } => ConversationApiError::Expired,
            HandleInboundError::InvalidInput(e) => ConversationApiError::BadRequest(e.to_string()),
            HandleInboundError::Repository(e) => ConversationApiError::Internal(e.to_string()),
        }
    }
}

impl From<GetConversationStatusError> for ConversationApiError {
    fn from(err: GetConversationStatusError) -> Self {
        match err {
            GetConversationStatusError::InvalidInput(e) => ConversationApiError::BadRequest(e.to_string()),
            GetConversationStatusError::Repository(e) => ConversationApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ConversationApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ConversationApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(ErrorCode::ValidationFailed.to_string(), msg),
            ),
            ConversationApiError::Expired => (
                StatusCode::GONE,
                ErrorResponse::new(
                    ErrorCode::ConversationExpired.to_string(),
                    replies::CONVERSATION_EXPIRED,
                ),
            ),
            ConversationApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(ErrorCode::InternalError.to_string(), "An internal error occurred"),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}
