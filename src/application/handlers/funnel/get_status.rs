//! GetConversationStatusHandler - Read-only funnel snapshot for a phone number.

use chrono::Duration;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::domain::conversation::{CollectedFields, ConversationStatus, FunnelStep};
use crate::domain::foundation::{DomainError, PhoneNumber, Timestamp, ValidationError};
use crate::ports::ConversationRepository;

/// Query for a conversation's status
#[derive(Debug, Clone)]
pub struct GetConversationStatusQuery {
    pub phone_number: String,
}

/// Lifecycle as seen by callers. `NotFound` is an answer, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Active,
    Expired,
    Qualified,
    Rejected,
    NotFound,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Active => "active",
            LeadStatus::Expired => "expired",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Rejected => "rejected",
            LeadStatus::NotFound => "not_found",
        }
    }
}

impl From<ConversationStatus> for LeadStatus {
    fn from(status: ConversationStatus) -> Self {
        match status {
            ConversationStatus::Active => LeadStatus::Active,
            ConversationStatus::Expired => LeadStatus::Expired,
            ConversationStatus::Qualified => LeadStatus::Qualified,
            ConversationStatus::Rejected => LeadStatus::Rejected,
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationStatusView {
    pub phone_number: PhoneNumber,
    pub status: LeadStatus,
    pub funnel_step: Option<FunnelStep>,
    pub fields: CollectedFields,
    pub qualified: Option<bool>,
}

/// Error type for status queries
#[derive(Debug, thiserror::Error)]
pub enum GetConversationStatusError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("repository error: {0}")]
    Repository(#[from] DomainError),
}

/// Handler for status queries
pub struct GetConversationStatusHandler {
    repository: Arc<dyn ConversationRepository>,
    session_timeout: Duration,
}

impl GetConversationStatusHandler {
    pub fn new(repository: Arc<dyn ConversationRepository>, session_timeout: Duration) -> Self {
        Self {
            repository,
            session_timeout,
        }
    }

    pub async fn handle(
        &self,
        query: GetConversationStatusQuery,
    ) -> Result<ConversationStatusView, GetConversationStatusError> {
        let phone_number = PhoneNumber::new(query.phone_number)?;

        let view = match self.repository.find_by_phone(&phone_number).await? {
            Some(conversation) => ConversationStatusView {
                status: conversation
                    .effective_status(Timestamp::now(), self.session_timeout)
                    .into(),
                funnel_step: Some(conversation.funnel_step),
                fields: conversation.fields,
                qualified: conversation.qualified,
                phone_number,
            },
            None => ConversationStatusView {
                phone_number,
                status: LeadStatus::NotFound,
                funnel_step: None,
                fields: CollectedFields::default(),
                qualified: None,
            },
        };

        Ok(view)
    }
}
