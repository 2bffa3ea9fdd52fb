//! PostgreSQL implementation of ConversationRepository.
//!
//! Conversations live in `conversations` (unique on phone number); the
//! message log lives in `messages`, ordered by its serial column.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::conversation::{
    CollectedFields, Conversation, ConversationStatus, FunnelStep, Message, Role, StateUpdate,
};
use crate::domain::foundation::{
    ConversationId, DomainError, MessageId, PhoneNumber, Timestamp,
};
use crate::ports::ConversationRepository;

const CONVERSATION_COLUMNS: &str = "id, phone_number, funnel_step, status, name, birth_date, \
     weight_loss_reason, qualified, last_activity_at, created_at";

/// PostgreSQL implementation of ConversationRepository.
#[derive(Clone)]
pub struct PostgresConversationRepository {
    pool: PgPool,
}

impl PostgresConversationRepository {
    /// Creates a new PostgresConversationRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn find_by_phone(&self, phone_number: &PhoneNumber) -> Result<Option<Conversation>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM conversations WHERE phone_number = $1",
            CONVERSATION_COLUMNS
        ))
        .bind(phone_number.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch conversation: {}", e)))?;

        row.as_ref().map(row_to_conversation).transpose()
    }

    async fn create(&self, phone_number: &PhoneNumber) -> Result<Conversation, DomainError> {
        let conversation = Conversation::start(phone_number.clone(), Timestamp::now());

        sqlx::query(
            r#"
            INSERT INTO conversations (
                id, phone_number, funnel_step, status, last_activity_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(conversation.id.as_uuid())
        .bind(phone_number.as_str())
        .bind(conversation.funnel_step.as_str())
        .bind(conversation.status.as_str())
        .bind(conversation.last_activity_at.as_datetime())
        .bind(conversation.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert conversation: {}", e)))?;

        Ok(conversation)
    }

    async fn apply_update(
        &self,
        phone_number: &PhoneNumber,
        update: &StateUpdate,
    ) -> Result<Conversation, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to start transaction: {}", e)))?;

        // Lock the row so the transition check and the write see the same state
        let row = sqlx::query(&format!(
            "SELECT {} FROM conversations WHERE phone_number = $1 FOR UPDATE",
            CONVERSATION_COLUMNS
        ))
        .bind(phone_number.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch conversation: {}", e)))?
        .ok_or_else(|| DomainError::conversation_not_found(phone_number.as_str()))?;

        let mut conversation = row_to_conversation(&row)?;
        conversation.apply(update)?;

        sqlx::query(
            r#"
            UPDATE conversations SET
                funnel_step = $2,
                status = $3,
                name = $4,
                birth_date = $5,
                weight_loss_reason = $6,
                qualified = $7,
                last_activity_at = $8
            WHERE id = $1
            "#,
        )
        .bind(conversation.id.as_uuid())
        .bind(conversation.funnel_step.as_str())
        .bind(conversation.status.as_str())
        .bind(conversation.fields.name.as_deref())
        .bind(conversation.fields.birth_date)
        .bind(conversation.fields.weight_loss_reason.as_deref())
        .bind(conversation.qualified)
        .bind(conversation.last_activity_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update conversation: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit transaction: {}", e)))?;

        Ok(conversation)
    }

    async fn append_message(&self, message: &Message) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(message.conversation_id().as_uuid())
        .bind(message.role().as_str())
        .bind(message.content())
        .bind(message.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert message: {}", e)))?;

        Ok(())
    }

    async fn list_messages(&self, conversation_id: &ConversationId) -> Result<Vec<Message>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, role, content, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(conversation_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch messages: {}", e)))?;

        rows.iter().map(row_to_message).collect()
    }
}

// === Helper Functions ===

fn row_to_conversation(row: &PgRow) -> Result<Conversation, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(column_error)?;
    let phone_number: String = row.try_get("phone_number").map_err(column_error)?;
    let funnel_step: String = row.try_get("funnel_step").map_err(column_error)?;
    let status: String = row.try_get("status").map_err(column_error)?;
    let name: Option<String> = row.try_get("name").map_err(column_error)?;
    let birth_date: Option<NaiveDate> = row.try_get("birth_date").map_err(column_error)?;
    let weight_loss_reason: Option<String> = row.try_get("weight_loss_reason").map_err(column_error)?;
    let qualified: Option<bool> = row.try_get("qualified").map_err(column_error)?;
    let last_activity_at: DateTime<Utc> = row.try_get("last_activity_at").map_err(column_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(column_error)?;

    Ok(Conversation {
        id: ConversationId::from_uuid(id),
        phone_number: PhoneNumber::new(phone_number)?,
        funnel_step: funnel_step.parse::<FunnelStep>()?,
        status: status.parse::<ConversationStatus>()?,
        fields: CollectedFields {
            name,
            birth_date,
            weight_loss_reason,
        },
        qualified,
        last_activity_at: Timestamp::from_datetime(last_activity_at),
        created_at: Timestamp::from_datetime(created_at),
    })
}

fn row_to_message(row: &PgRow) -> Result<Message, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(column_error)?;
    let conversation_id: uuid::Uuid = row.try_get("conversation_id").map_err(column_error)?;
    let role: String = row.try_get("role").map_err(column_error)?;
    let content: String = row.try_get("content").map_err(column_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(column_error)?;

    Ok(Message::reconstitute(
        MessageId::from_uuid(id),
        ConversationId::from_uuid(conversation_id),
        role.parse::<Role>()?,
        content,
        Timestamp::from_datetime(created_at),
    ))
}

fn column_error(e: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to decode column: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use sqlx::postgres::PgPoolOptions;

    // ════════════════════════════════════════════════════════════════════════════
    // Integration Tests (require PostgreSQL, marked ignore)
    // ════════════════════════════════════════════════════════════════════════════

    async fn repository() -> PostgresConversationRepository {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("Failed to connect to database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        PostgresConversationRepository::new(pool)
    }

    fn unique_phone() -> PhoneNumber {
        PhoneNumber::new(format!("55{}", uuid::Uuid::new_v4().simple())).unwrap()
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn create_find_and_update_round_trip() {
        let repo = repository().await;
        let phone = unique_phone();

        let created = repo.create(&phone).await.unwrap();
        let found = repo.find_by_phone(&phone).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.funnel_step, FunnelStep::CollectName);

        let date = NaiveDate::from_ymd_opt(1990, 3, 15).unwrap();
        repo.apply_update(
            &phone,
            &StateUpdate::touch(Timestamp::now())
                .with_name("Maria")
                .with_step(FunnelStep::CollectBirthDate),
        )
        .await
        .unwrap();
        let updated = repo
            .apply_update(
                &phone,
                &StateUpdate::touch(Timestamp::now())
                    .with_birth_date(date)
                    .with_step(FunnelStep::CollectWeightLossReason),
            )
            .await
            .unwrap();

        assert_eq!(updated.fields.name.as_deref(), Some("Maria"));
        assert_eq!(updated.fields.birth_date, Some(date));
        assert_eq!(updated.funnel_step, FunnelStep::CollectWeightLossReason);
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn duplicate_phone_is_rejected() {
        let repo = repository().await;
        let phone = unique_phone();
        repo.create(&phone).await.unwrap();

        let err = repo.create(&phone).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn messages_keep_insertion_order() {
        let repo = repository().await;
        let conversation = repo.create(&unique_phone()).await.unwrap();

        let first = Message::new(conversation.id, Role::User, "Oi").unwrap();
        let second = Message::new(conversation.id, Role::Assistant, "Olá!").unwrap();
        repo.append_message(&first).await.unwrap();
        repo.append_message(&second).await.unwrap();

        let messages = repo.list_messages(&conversation.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id(), first.id());
        assert_eq!(messages[1].role(), Role::Assistant);
    }
}
