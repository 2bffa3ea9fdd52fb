//! Conversation aggregate.
//!
//! One conversation per phone number. Holds the funnel position, lifecycle
//! status and the fields collected so far.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, PhoneNumber, StateMachine, Timestamp, ValidationError};

use super::{ConversationStatus, FunnelStep, StateUpdate};

/// Data gathered from the lead across the collection steps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectedFields {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub weight_loss_reason: Option<String>,
}

/// Snapshot handed to reply generation: which step to speak for, plus what
/// is known about the lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyContext {
    pub step: FunnelStep,
    pub fields: CollectedFields,
}

impl ReplyContext {
    /// Same collected data, rendered for a different step.
    pub fn with_step(mut self, step: FunnelStep) -> Self {
        self.step = step;
        self
    }
}

/// The qualification conversation with a single lead.
///
/// # Invariants
///
/// - `phone_number` is unique across conversations
/// - `funnel_step` and `status` only move forward (see [`StateMachine`])
/// - once `status` is qualified or rejected the funnel no longer progresses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub phone_number: PhoneNumber,
    pub funnel_step: FunnelStep,
    pub status: ConversationStatus,
    pub fields: CollectedFields,
    pub qualified: Option<bool>,
    pub last_activity_at: Timestamp,
    pub created_at: Timestamp,
}

impl Conversation {
    /// Opens a fresh conversation at the first funnel step.
    pub fn start(phone_number: PhoneNumber, now: Timestamp) -> Self {
        Self {
            id: ConversationId::new(),
            phone_number,
            funnel_step: FunnelStep::default(),
            status: ConversationStatus::default(),
            fields: CollectedFields::default(),
            qualified: None,
            last_activity_at: now,
            created_at: now,
        }
    }

    /// True when more than `timeout` has elapsed since the last activity.
    pub fn is_expired(&self, now: Timestamp, timeout: Duration) -> bool {
        now.duration_since(&self.last_activity_at) > timeout
    }

    /// Status as observed at `now`.
    ///
    /// An active conversation past the session timeout reads as expired even
    /// though nothing was persisted.
    pub fn effective_status(&self, now: Timestamp, timeout: Duration) -> ConversationStatus {
        if self.status == ConversationStatus::Active && self.is_expired(now, timeout) {
            ConversationStatus::Expired
        } else {
            self.status
        }
    }

    /// Context for rendering a reply against the current step.
    pub fn reply_context(&self) -> ReplyContext {
        ReplyContext {
            step: self.funnel_step,
            fields: self.fields.clone(),
        }
    }

    /// Applies a turn's update, validating step and status transitions.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` on `state_transition` if the step or status would
    ///   move backwards or leave a terminal state
    pub fn apply(&mut self, update: &StateUpdate) -> Result<(), ValidationError> {
        let next_step = match update.funnel_step {
            Some(step) if step != self.funnel_step => self.funnel_step.transition_to(step)?,
            _ => self.funnel_step,
        };
        let next_status = match update.status {
            Some(status) if status != self.status => self.status.transition_to(status)?,
            _ => self.status,
        };

        self.funnel_step = next_step;
        self.status = next_status;
        if let Some(name) = &update.name {
            self.fields.name = Some(name.clone());
        }
        if let Some(date) = update.birth_date {
            self.fields.birth_date = Some(date);
        }
        if let Some(reason) = &update.weight_loss_reason {
            self.fields.weight_loss_reason = Some(reason.clone());
        }
        if let Some(qualified) = update.qualified {
            self.qualified = Some(qualified);
        }
        self.last_activity_at = update.last_activity_at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> Conversation {
        Conversation::start(PhoneNumber::new("5511999999999").unwrap(), Timestamp::now())
    }

    #[test]
    fn starts_active_at_collect_name() {
        let conv = conversation();
        assert_eq!(conv.funnel_step, FunnelStep::CollectName);
        assert_eq!(conv.status, ConversationStatus::Active);
        assert_eq!(conv.fields, CollectedFields::default());
        assert_eq!(conv.qualified, None);
    }

    #[test]
    fn expiry_is_strictly_greater_than_timeout() {
        let mut conv = conversation();
        let now = Timestamp::now();

        conv.last_activity_at = now.minus_minutes(30);
        assert!(!conv.is_expired(now, Duration::minutes(30)));

        conv.last_activity_at = now.minus_minutes(31);
        assert!(conv.is_expired(now, Duration::minutes(30)));
    }

    #[test]
    fn effective_status_only_expires_active_conversations() {
        let mut conv = conversation();
        let now = Timestamp::now();
        conv.last_activity_at = now.minus_minutes(90);
        assert_eq!(
            conv.effective_status(now, Duration::minutes(30)),
            ConversationStatus::Expired
        );

        conv.status = ConversationStatus::Qualified;
        conv.funnel_step = FunnelStep::Qualified;
        assert_eq!(
            conv.effective_status(now, Duration::minutes(30)),
            ConversationStatus::Qualified
        );
    }

    #[test]
    fn apply_sets_fields_and_advances_step() {
        let mut conv = conversation();
        let now = Timestamp::now().plus_secs(5);
        let update = StateUpdate::touch(now)
            .with_name("Maria")
            .with_step(FunnelStep::CollectBirthDate);

        conv.apply(&update).unwrap();

        assert_eq!(conv.fields.name.as_deref(), Some("Maria"));
        assert_eq!(conv.funnel_step, FunnelStep::CollectBirthDate);
        assert_eq!(conv.last_activity_at, now);
    }

    #[test]
    fn apply_rejects_skipping_steps() {
        let mut conv = conversation();
        let update = StateUpdate::touch(Timestamp::now()).with_outcome(true);

        assert!(conv.apply(&update).is_err());
        assert_eq!(conv.funnel_step, FunnelStep::CollectName);
        assert_eq!(conv.status, ConversationStatus::Active);
    }

    #[test]
    fn apply_records_outcome_from_reason_step() {
        let mut conv = conversation();
        conv.funnel_step = FunnelStep::CollectWeightLossReason;
        let update = StateUpdate::touch(Timestamp::now())
            .with_weight_loss_reason("Preciso fazer cirurgia")
            .with_outcome(true);

        conv.apply(&update).unwrap();

        assert_eq!(conv.funnel_step, FunnelStep::Qualified);
        assert_eq!(conv.status, ConversationStatus::Qualified);
        assert_eq!(conv.qualified, Some(true));
        assert!(conv.funnel_step.is_terminal() && conv.status.is_terminal());
    }

    #[test]
    fn reply_context_can_be_retargeted() {
        let mut conv = conversation();
        conv.fields.name = Some("Ana".to_string());

        let ctx = conv.reply_context().with_step(FunnelStep::Rejected);

        assert_eq!(ctx.step, FunnelStep::Rejected);
        assert_eq!(ctx.fields.name.as_deref(), Some("Ana"));
        assert_eq!(conv.funnel_step, FunnelStep::CollectName);
    }
}
