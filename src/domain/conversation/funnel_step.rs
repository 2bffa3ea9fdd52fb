//! Funnel step state machine.
//!
//! The ordered collection steps a lead walks through, ending in one of the
//! two terminal qualification outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// The step of the qualification funnel a conversation is on.
///
/// `collect_name → collect_birth_date → collect_weight_loss_reason → {qualified | rejected}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStep {
    /// Waiting for the lead's name.
    #[default]
    CollectName,

    /// Waiting for a DD/MM/YYYY birth date.
    CollectBirthDate,

    /// Waiting for the free-text motivation to lose weight.
    CollectWeightLossReason,

    /// Health-related motivation. Terminal.
    Qualified,

    /// Appearance-related motivation. Terminal.
    Rejected,
}

impl FunnelStep {
    /// Returns the snake_case wire/storage name of the step.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollectName => "collect_name",
            Self::CollectBirthDate => "collect_birth_date",
            Self::CollectWeightLossReason => "collect_weight_loss_reason",
            Self::Qualified => "qualified",
            Self::Rejected => "rejected",
        }
    }
}

impl StateMachine for FunnelStep {
    fn can_transition_to(&self, target: &Self) -> bool {
        use FunnelStep::*;
        matches!(
            (self, target),
            (CollectName, CollectBirthDate)
                | (CollectBirthDate, CollectWeightLossReason)
                | (CollectWeightLossReason, Qualified)
                | (CollectWeightLossReason, Rejected)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use FunnelStep::*;
        match self {
            CollectName => vec![CollectBirthDate],
            CollectBirthDate => vec![CollectWeightLossReason],
            CollectWeightLossReason => vec![Qualified, Rejected],
            Qualified | Rejected => vec![],
        }
    }
}

impl fmt::Display for FunnelStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunnelStep {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collect_name" => Ok(Self::CollectName),
            "collect_birth_date" => Ok(Self::CollectBirthDate),
            "collect_weight_loss_reason" => Ok(Self::CollectWeightLossReason),
            "qualified" => Ok(Self::Qualified),
            "rejected" => Ok(Self::Rejected),
            other => Err(ValidationError::invalid_format(
                "funnel_step",
                format!("unknown step '{}'", other),
            )),
        }
    }
}
