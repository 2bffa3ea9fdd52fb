//! HTTP DTOs for conversation endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::{ConversationStatusView, LeadStatus};
use crate::domain::conversation::{CollectedFields, Conversation, ConversationStatus, FunnelStep};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /conversations/:phone_number/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    /// Missing content deserializes as empty and is rejected by validation.
    #[serde(default)]
    pub content: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Collected lead data. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablesView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// ISO date (`YYYY-MM-DD`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_loss_reason: Option<String>,
}

impl From<&CollectedFields> for VariablesView {
    fn from(fields: &CollectedFields) -> Self {
        Self {
            name: fields.name.clone(),
            birth_date: fields.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
            weight_loss_reason: fields.weight_loss_reason.clone(),
        }
    }
}

/// Conversation snapshot returned after each message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub phone_number: String,
    pub status: ConversationStatus,
    pub funnel_step: FunnelStep,
    pub variables: VariablesView,
}

impl From<&Conversation> for ConversationView {
    fn from(conversation: &Conversation) -> Self {
        Self {
            phone_number: conversation.phone_number.to_string(),
            status: conversation.status,
            funnel_step: conversation.funnel_step,
            variables: VariablesView::from(&conversation.fields),
        }
    }
}

/// Reply to an inbound message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Always `"text"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub content: String,
    pub conversation: ConversationView,
}

impl MessageResponse {
    pub fn text(content: String, conversation: &Conversation) -> Self {
        Self {
            kind: "text",
            content,
            conversation: ConversationView::from(conversation),
        }
    }
}

/// Response of `GET /conversations/:phone_number/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStatusResponse {
    pub phone_number: String,
    pub status: LeadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funnel_step: Option<FunnelStep>,
    pub variables: VariablesView,
}

impl From<ConversationStatusView> for ConversationStatusResponse {
    fn from(view: ConversationStatusView) -> Self {
        Self {
            phone_number: view.phone_number.to_string(),
            status: view.status,
            funnel_step: view.funnel_step,
            variables: VariablesView::from(&view.fields),
        }
    }
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
