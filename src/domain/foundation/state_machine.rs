//! Guarded transitions for lifecycle enums.

use super::ValidationError;

/// A closed set of states with an explicit edge list.
///
/// `FunnelStep` and `ConversationStatus` implement this so that a
/// [`StateUpdate`](crate::domain::conversation::StateUpdate) can never move a
/// conversation backwards or out of a terminal state.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    fn can_transition_to(&self, target: &Self) -> bool;

    /// States reachable in one step. Empty for terminal states.
    fn valid_transitions(&self) -> Vec<Self>;

    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_format(
                "state_transition",
                format!("{:?} cannot move to {:?}", self, target),
            ));
        }
        Ok(target)
    }

    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
