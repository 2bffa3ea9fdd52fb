//! In-Memory Conversation Repository
//!
//! Keeps conversations and their message logs in process memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{Conversation, Message, StateUpdate};
use crate::domain::foundation::{ConversationId, DomainError, PhoneNumber, Timestamp};
use crate::ports::ConversationRepository;

/// In-memory storage for conversations
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationRepository {
    conversations: Arc<RwLock<HashMap<PhoneNumber, Conversation>>>,
    messages: Arc<RwLock<HashMap<ConversationId, Vec<Message>>>>,
}

impl InMemoryConversationRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a conversation as-is, replacing any existing one for the number
    pub async fn insert(&self, conversation: Conversation) {
        self.conversations
            .write()
            .await
            .insert(conversation.phone_number.clone(), conversation);
    }

    /// Get the number of stored conversations
    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn find_by_phone(&self, phone_number: &PhoneNumber) -> Result<Option<Conversation>, DomainError> {
        Ok(self.conversations.read().await.get(phone_number).cloned())
    }

    async fn create(&self, phone_number: &PhoneNumber) -> Result<Conversation, DomainError> {
        let mut conversations = self.conversations.write().await;
        if conversations.contains_key(phone_number) {
            return Err(DomainError::database("Conversation already exists")
                .with_detail("phone_number", phone_number.as_str()));
        }
        let conversation = Conversation::start(phone_number.clone(), Timestamp::now());
        conversations.insert(phone_number.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn apply_update(
        &self,
        phone_number: &PhoneNumber,
        update: &StateUpdate,
    ) -> Result<Conversation, DomainError> {
        let mut conversations = self.conversations.write().await;
        let stored = conversations
            .get_mut(phone_number)
            .ok_or_else(|| DomainError::conversation_not_found(phone_number.as_str()))?;

        let mut updated = stored.clone();
        updated.apply(update)?;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn append_message(&self, message: &Message) -> Result<(), DomainError> {
        self.messages
            .write()
            .await
            .entry(message.conversation_id())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn list_messages(&self, conversation_id: &ConversationId) -> Result<Vec<Message>, DomainError> {
        Ok(self
            .messages
            .read()
            .await
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }
}
