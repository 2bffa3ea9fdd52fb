//! Partial update produced by one funnel turn.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::{ConversationStatus, FunnelStep};

/// Field changes to persist after a turn.
///
/// `last_activity_at` is always present; every other field is only written
/// when `Some`. Persistence applies the whole record atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub last_activity_at: Timestamp,
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub weight_loss_reason: Option<String>,
    pub funnel_step: Option<FunnelStep>,
    pub status: Option<ConversationStatus>,
    pub qualified: Option<bool>,
}

impl StateUpdate {
    /// An update that only refreshes the activity timestamp.
    pub fn touch(now: Timestamp) -> Self {
        Self {
            last_activity_at: now,
            name: None,
            birth_date: None,
            weight_loss_reason: None,
            funnel_step: None,
            status: None,
            qualified: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_birth_date(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    pub fn with_weight_loss_reason(mut self, reason: impl Into<String>) -> Self {
        self.weight_loss_reason = Some(reason.into());
        self
    }

    pub fn with_step(mut self, step: FunnelStep) -> Self {
        self.funnel_step = Some(step);
        self
    }

    /// Records the qualification decision: terminal step, matching status and
    /// the `qualified` flag.
    pub fn with_outcome(mut self, qualified: bool) -> Self {
        let step = if qualified {
            FunnelStep::Qualified
        } else {
            FunnelStep::Rejected
        };
        self.funnel_step = Some(step);
        self.status = ConversationStatus::for_outcome(step);
        self.qualified = Some(qualified);
        self
    }

    /// True when nothing but the timestamp changes.
    #[cfg(test)]
    pub fn is_touch_only(&self) -> bool {
        self.name.is_none()
            && self.birth_date.is_none()
            && self.weight_loss_reason.is_none()
            && self.funnel_step.is_none()
            && self.status.is_none()
            && self.qualified.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_only_changes_timestamp() {
        let update = StateUpdate::touch(Timestamp::now());
        assert!(update.is_touch_only());
    }

    #[test]
    fn rejected_outcome_sets_step_status_and_flag() {
        let update = StateUpdate::touch(Timestamp::now())
            .with_weight_loss_reason("Quero um corpo perfeito")
            .with_outcome(false);

        assert_eq!(update.funnel_step, Some(FunnelStep::Rejected));
        assert_eq!(update.status, Some(ConversationStatus::Rejected));
        assert_eq!(update.qualified, Some(false));
        assert!(!update.is_touch_only());
    }
}
