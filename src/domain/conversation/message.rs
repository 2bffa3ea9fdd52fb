//! Message entity for the conversation log.
//!
//! Messages are immutable records of user/assistant exchanges. The log is
//! append-only; order is the storage sequence, not the timestamp.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{ConversationId, MessageId, Timestamp, ValidationError};

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Inbound text from the lead.
    User,
    /// Reply produced by the funnel.
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// An immutable message within a conversation.
///
/// # Invariants
///
/// - `content` is non-empty (validated at construction)
/// - `created_at` is set at construction and never changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    conversation_id: ConversationId,
    role: Role,
    content: String,
    created_at: Timestamp,
}

impl Message {
    /// Creates a new message.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if content is blank
    pub fn new(
        conversation_id: ConversationId,
        role: Role,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }

        Ok(Self {
            id: MessageId::new(),
            conversation_id,
            role,
            content,
            created_at: Timestamp::now(),
        })
    }

    /// Rebuilds a message loaded from storage.
    pub fn reconstitute(
        id: MessageId,
        conversation_id: ConversationId,
        role: Role,
        content: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            conversation_id,
            role,
            content,
            created_at,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_keeps_role_and_content() {
        let conversation_id = ConversationId::new();
        let msg = Message::new(conversation_id, Role::User, "Maria").unwrap();

        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.content(), "Maria");
        assert_eq!(msg.conversation_id(), conversation_id);
    }

    #[test]
    fn blank_content_is_rejected() {
        let result = Message::new(ConversationId::new(), Role::Assistant, "  \n");
        assert_eq!(result, Err(ValidationError::empty_field("content")));
    }

    #[test]
    fn role_roundtrips_through_storage_name() {
        assert_eq!("assistant".parse::<Role>(), Ok(Role::Assistant));
        assert_eq!(Role::User.to_string(), "user");
        assert!("system".parse::<Role>().is_err());
    }
}
