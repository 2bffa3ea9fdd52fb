//! HandleInboundHandler - One inbound message through the qualification funnel.
//!
//! A turn runs on its own task. Dropping the caller's future (client
//! disconnect, a timeout further out) does not stop it, so the message log
//! never holds a user message without its reply and state update.

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::conversation::{Conversation, Message, Role};
use crate::domain::foundation::{DomainError, ErrorCode, PhoneNumber, Timestamp, ValidationError};
use crate::domain::funnel::FunnelStateMachine;
use crate::ports::ConversationRepository;

use super::phone_locks::PhoneLocks;

/// Command to process a message from a lead
#[derive(Debug, Clone)]
pub struct HandleInboundCommand {
    pub phone_number: String,
    pub content: String,
}

/// Reply to send plus the conversation after the turn
#[derive(Debug, Clone)]
pub struct HandleInboundResult {
    pub reply: String,
    pub conversation: Conversation,
}

/// Error type for inbound message handling
#[derive(Debug, thiserror::Error)]
pub enum HandleInboundError {
    /// Existing conversation idle past the session timeout. Nothing was written.
    #[error("conversation for {phone_number} expired")]
    Expired { phone_number: String },

    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("repository error: {0}")]
    Repository(#[from] DomainError),
}

/// Handler for inbound lead messages
pub struct HandleInboundHandler {
    turns: Arc<TurnRunner>,
}

struct TurnRunner {
    repository: Arc<dyn ConversationRepository>,
    funnel: FunnelStateMachine,
    session_timeout: Duration,
    locks: PhoneLocks,
}

impl HandleInboundHandler {
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        funnel: FunnelStateMachine,
        session_timeout: Duration,
    ) -> Self {
        Self {
            turns: Arc::new(TurnRunner {
                repository,
                funnel,
                session_timeout,
                locks: PhoneLocks::new(),
            }),
        }
    }

    pub async fn handle(&self, cmd: HandleInboundCommand) -> Result<HandleInboundResult, HandleInboundError> {
        let phone_number = PhoneNumber::new(cmd.phone_number)?;
        if cmd.content.trim().is_empty() {
            return Err(ValidationError::empty_field("content").into());
        }

        let turns = Arc::clone(&self.turns);
        tokio::spawn(async move { turns.run(phone_number, cmd.content).await })
            .await
            .map_err(|e| {
                HandleInboundError::Repository(DomainError::new(
                    ErrorCode::InternalError,
                    format!("turn task failed: {}", e),
                ))
            })?
    }
}

impl TurnRunner {
    async fn run(&self, phone_number: PhoneNumber, content: String) -> Result<HandleInboundResult, HandleInboundError> {
        let _turn = self.locks.acquire(phone_number.as_str()).await;
        let now = Timestamp::now();

        // 1. Load or open the conversation; expiry is checked before any write
        let (conversation, is_new) = match self.repository.find_by_phone(&phone_number).await? {
            Some(existing) if existing.is_expired(now, self.session_timeout) => {
                info!(phone_number = %phone_number, "Inbound message on expired conversation");
                return Err(HandleInboundError::Expired {
                    phone_number: phone_number.to_string(),
                });
            }
            Some(existing) => (existing, false),
            None => {
                let created = self.repository.create(&phone_number).await?;
                info!(phone_number = %phone_number, conversation_id = %created.id, "Conversation started");
                (created, true)
            }
        };

        // 2. Log the user's message
        let inbound = Message::new(conversation.id, Role::User, content.as_str())?;
        self.repository.append_message(&inbound).await?;

        // 3. Advance the funnel
        let outcome = self
            .funnel
            .advance(&conversation, &content, is_new, now)
            .await;

        // 4. Log the reply and persist the update
        let reply = Message::new(conversation.id, Role::Assistant, outcome.reply.as_str())?;
        self.repository.append_message(&reply).await?;

        let updated = self
            .repository
            .apply_update(&phone_number, &outcome.update)
            .await?;

        debug!(
            phone_number = %phone_number,
            from = %conversation.funnel_step,
            to = %updated.funnel_step,
            status = %updated.status,
            "Funnel turn complete"
        );

        Ok(HandleInboundResult {
            reply: outcome.reply,
            conversation: updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryConversationRepository;
    use crate::domain::conversation::{ConversationStatus, FunnelStep, ReplyContext, StateUpdate};
    use crate::domain::foundation::{ConversationId, ErrorCode};
    use crate::domain::funnel::{replies, SimilarityClassifier};
    use crate::ports::{AIError, ReplyGenerator};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    // Mock implementations for testing

    struct FixedReply(&'static str);

    #[async_trait]
    impl ReplyGenerator for FixedReply {
        async fn generate_reply(&self, _context: ReplyContext, _user_text: &str) -> Result<String, AIError> {
            Ok(self.0.to_string())
        }
    }

    /// Repository whose writes fail after a successful lookup.
    struct FailingWrites {
        inner: InMemoryConversationRepository,
        appended: Mutex<usize>,
    }

    #[async_trait]
    impl ConversationRepository for FailingWrites {
        async fn find_by_phone(&self, phone_number: &PhoneNumber) -> Result<Option<Conversation>, DomainError> {
            self.inner.find_by_phone(phone_number).await
        }

        async fn create(&self, phone_number: &PhoneNumber) -> Result<Conversation, DomainError> {
            self.inner.create(phone_number).await
        }

        async fn apply_update(
            &self,
            _phone_number: &PhoneNumber,
            _update: &StateUpdate,
        ) -> Result<Conversation, DomainError> {
            Err(DomainError::database("connection reset"))
        }

        async fn append_message(&self, _message: &Message) -> Result<(), DomainError> {
            *self.appended.lock().unwrap() += 1;
            Ok(())
        }

        async fn list_messages(&self, _conversation_id: &ConversationId) -> Result<Vec<Message>, DomainError> {
            Ok(Vec::new())
        }
    }

    const PHONE: &str = "5511999999999";

    fn handler(repo: Arc<dyn ConversationRepository>) -> HandleInboundHandler {
        let funnel = FunnelStateMachine::new(
            Arc::new(FixedReply("Resposta gerada")),
            SimilarityClassifier::keyword_only(),
        );
        HandleInboundHandler::new(repo, funnel, Duration::minutes(30))
    }

    fn command(content: &str) -> HandleInboundCommand {
        HandleInboundCommand {
            phone_number: PHONE.to_string(),
            content: content.to_string(),
        }
    }

    async fn seeded(repo: &InMemoryConversationRepository, step: FunnelStep, idle_minutes: i64) -> Conversation {
        let mut conversation = Conversation::start(PhoneNumber::new(PHONE).unwrap(), Timestamp::now());
        conversation.funnel_step = step;
        conversation.fields.name = Some("Maria".to_string());
        conversation.last_activity_at = Timestamp::now().minus_minutes(idle_minutes);
        repo.insert(conversation.clone()).await;
        conversation
    }

    #[tokio::test]
    async fn greeting_opens_a_conversation_with_the_welcome() {
        let repo = Arc::new(InMemoryConversationRepository::new());
        let result = handler(repo.clone()).handle(command("Oi")).await.unwrap();

        assert_eq!(result.reply, replies::WELCOME);
        assert_eq!(result.conversation.funnel_step, FunnelStep::CollectName);
        assert_eq!(result.conversation.status, ConversationStatus::Active);

        let messages = repo.list_messages(&result.conversation.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), Role::User);
        assert_eq!(messages[0].content(), "Oi");
        assert_eq!(messages[1].content(), replies::WELCOME);
    }

    #[tokio::test]
    async fn name_then_date_advance_the_funnel() {
        let repo = Arc::new(InMemoryConversationRepository::new());
        let handler = handler(repo.clone());

        handler.handle(command("Oi")).await.unwrap();
        let after_name = handler.handle(command("Maria")).await.unwrap();
        assert_eq!(after_name.conversation.fields.name.as_deref(), Some("Maria"));
        assert_eq!(after_name.conversation.funnel_step, FunnelStep::CollectBirthDate);
        assert_eq!(after_name.reply, "Resposta gerada");

        let after_date = handler.handle(command("15/03/1990")).await.unwrap();
        assert_eq!(
            after_date.conversation.fields.birth_date,
            NaiveDate::from_ymd_opt(1990, 3, 15)
        );
        assert_eq!(after_date.conversation.funnel_step, FunnelStep::CollectWeightLossReason);
    }

    #[tokio::test]
    async fn health_reason_qualifies() {
        let repo = Arc::new(InMemoryConversationRepository::new());
        seeded(&repo, FunnelStep::CollectWeightLossReason, 1).await;

        let result = handler(repo).handle(command("Preciso fazer cirurgia")).await.unwrap();

        assert_eq!(result.conversation.status, ConversationStatus::Qualified);
        assert_eq!(result.conversation.funnel_step, FunnelStep::Qualified);
        assert_eq!(result.conversation.qualified, Some(true));
        assert_eq!(
            result.conversation.fields.weight_loss_reason.as_deref(),
            Some("Preciso fazer cirurgia")
        );
    }

    #[tokio::test]
    async fn expired_conversation_is_left_untouched() {
        let repo = Arc::new(InMemoryConversationRepository::new());
        let before = seeded(&repo, FunnelStep::CollectBirthDate, 31).await;

        let err = handler(repo.clone()).handle(command("15/03/1990")).await.unwrap_err();

        assert!(matches!(err, HandleInboundError::Expired { .. }));
        let after = repo.find_by_phone(&before.phone_number).await.unwrap().unwrap();
        assert_eq!(after, before);
        assert!(repo.list_messages(&before.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn terminal_conversations_also_expire() {
        let repo = Arc::new(InMemoryConversationRepository::new());
        seeded(&repo, FunnelStep::Qualified, 45).await;

        let err = handler(repo).handle(command("Olá de novo")).await.unwrap_err();
        assert!(matches!(err, HandleInboundError::Expired { .. }));
    }

    #[tokio::test]
    async fn blank_content_is_rejected_before_any_lookup() {
        let repo = Arc::new(InMemoryConversationRepository::new());
        let err = handler(repo.clone()).handle(command("   ")).await.unwrap_err();

        assert!(matches!(err, HandleInboundError::InvalidInput(_)));
        assert_eq!(repo.conversation_count().await, 0);
    }

    #[tokio::test]
    async fn blank_phone_number_is_rejected() {
        let repo = Arc::new(InMemoryConversationRepository::new());
        let err = handler(repo)
            .handle(HandleInboundCommand {
                phone_number: " ".to_string(),
                content: "Oi".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HandleInboundError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn persistence_failures_propagate() {
        let repo = Arc::new(FailingWrites {
            inner: InMemoryConversationRepository::new(),
            appended: Mutex::new(0),
        });

        let err = handler(repo.clone()).handle(command("Maria")).await.unwrap_err();

        match err {
            HandleInboundError::Repository(e) => assert_eq!(e.code(), ErrorCode::DatabaseError),
            other => panic!("expected repository error, got {other:?}"),
        }
        assert_eq!(*repo.appended.lock().unwrap(), 2);
    }
}
