//! Conversation repository port.
//!
//! Persists the conversation record keyed by phone number and its
//! append-only message log.
//!
//! # Design
//!
//! - **Phone-scoped**: One conversation per phone number (unique constraint)
//! - **Partial updates**: A turn's [`StateUpdate`] is applied atomically
//! - **Append-only log**: Messages are never edited, order is insertion order

use crate::domain::conversation::{Conversation, Message, StateUpdate};
use crate::domain::foundation::{ConversationId, DomainError, PhoneNumber};
use async_trait::async_trait;

/// Repository port for conversations and their messages.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find the conversation for a phone number.
    ///
    /// Returns `None` if the number has never written in.
    async fn find_by_phone(&self, phone_number: &PhoneNumber) -> Result<Option<Conversation>, DomainError>;

    /// Create a fresh conversation for a phone number.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure or if the number already has one
    async fn create(&self, phone_number: &PhoneNumber) -> Result<Conversation, DomainError>;

    /// Apply a partial update and return the updated snapshot.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` if no conversation exists for the number
    /// - `DatabaseError` on persistence failure
    async fn apply_update(
        &self,
        phone_number: &PhoneNumber,
        update: &StateUpdate,
    ) -> Result<Conversation, DomainError>;

    /// Append a message to the conversation's log.
    async fn append_message(&self, message: &Message) -> Result<(), DomainError>;

    /// List a conversation's messages in creation order.
    async fn list_messages(&self, conversation_id: &ConversationId) -> Result<Vec<Message>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ConversationRepository) {}
    }
}
