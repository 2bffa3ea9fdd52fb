//! Domain error vocabulary.
//!
//! [`ValidationError`] comes out of value-object constructors and state
//! transitions. [`DomainError`] is what repositories and handlers return; its
//! [`ErrorCode`] is the stable string sent to API clients.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        Self::EmptyField { field: field.into() }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    EmptyField,
    InvalidFormat,
    ConversationNotFound,
    InvalidStateTransition,
    ConversationExpired,
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::EmptyField => "EMPTY_FIELD",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::ConversationNotFound => "CONVERSATION_NOT_FOUND",
            Self::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            Self::ConversationExpired => "CONVERSATION_EXPIRED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coded failure with free-form context for logs.
#[derive(Debug, Clone, Error)]
#[error("[{code}] {message}")]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn conversation_not_found(phone_number: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConversationNotFound, "Conversation not found")
            .with_detail("phone_number", phone_number)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = match &err {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::InvalidFormat { field, .. } if field == "state_transition" => {
                ErrorCode::InvalidStateTransition
            }
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        };
        Self::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_field() {
        assert_eq!(
            ValidationError::empty_field("phone_number").to_string(),
            "Field 'phone_number' cannot be empty"
        );
        assert_eq!(
            ValidationError::invalid_format("birth_date", "expected DD/MM/YYYY").to_string(),
            "Field 'birth_date' has invalid format: expected DD/MM/YYYY"
        );
    }

    #[test]
    fn domain_error_prefixes_code() {
        let err = DomainError::new(ErrorCode::ConversationExpired, "Conversation expired");
        assert_eq!(err.to_string(), "[CONVERSATION_EXPIRED] Conversation expired");
    }

    #[test]
    fn conversation_not_found_carries_phone_detail() {
        let err = DomainError::conversation_not_found("5511999999999");
        assert_eq!(err.code(), ErrorCode::ConversationNotFound);
        assert_eq!(
            err.details.get("phone_number").map(String::as_str),
            Some("5511999999999")
        );
    }

    #[test]
    fn rejected_transition_keeps_its_own_code() {
        let err: DomainError =
            ValidationError::invalid_format("state_transition", "Qualified cannot move to Rejected").into();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);

        let err: DomainError = ValidationError::empty_field("content").into();
        assert_eq!(err.code(), ErrorCode::EmptyField);
    }
}
