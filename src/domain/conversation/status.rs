//! Conversation lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

use super::FunnelStep;

/// Lifecycle status of a conversation.
///
/// `qualified` and `rejected` are terminal. `expired` marks a conversation
/// whose session timed out; it is reported, never silently reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    #[default]
    Active,
    Expired,
    Qualified,
    Rejected,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Qualified => "qualified",
            Self::Rejected => "rejected",
        }
    }

    /// Status implied by reaching a terminal funnel step.
    pub fn for_outcome(step: FunnelStep) -> Option<Self> {
        match step {
            FunnelStep::Qualified => Some(Self::Qualified),
            FunnelStep::Rejected => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl StateMachine for ConversationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationStatus::*;
        matches!(
            (self, target),
            (Active, Expired) | (Active, Qualified) | (Active, Rejected)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationStatus::*;
        match self {
            Active => vec![Expired, Qualified, Rejected],
            Expired | Qualified | Rejected => vec![],
        }
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "qualified" => Ok(Self::Qualified),
            "rejected" => Ok(Self::Rejected),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_can_reach_every_outcome() {
        let active = ConversationStatus::Active;
        assert!(active.can_transition_to(&ConversationStatus::Qualified));
        assert!(active.can_transition_to(&ConversationStatus::Rejected));
        assert!(active.can_transition_to(&ConversationStatus::Expired));
    }

    #[test]
    fn outcomes_are_terminal() {
        assert!(ConversationStatus::Qualified.is_terminal());
        assert!(ConversationStatus::Rejected.is_terminal());
        assert!(ConversationStatus::Expired.is_terminal());
        assert!(ConversationStatus::Qualified
            .transition_to(ConversationStatus::Active)
            .is_err());
    }

    #[test]
    fn outcome_status_follows_terminal_step() {
        assert_eq!(
            ConversationStatus::for_outcome(FunnelStep::Qualified),
            Some(ConversationStatus::Qualified)
        );
        assert_eq!(
            ConversationStatus::for_outcome(FunnelStep::Rejected),
            Some(ConversationStatus::Rejected)
        );
        assert_eq!(ConversationStatus::for_outcome(FunnelStep::CollectName), None);
    }

    #[test]
    fn parses_storage_names() {
        assert_eq!("expired".parse(), Ok(ConversationStatus::Expired));
        assert!("archived".parse::<ConversationStatus>().is_err());
    }
}
