//! Error types for the ceremony engine

use thiserror::Error;

use crate::{AwardId, CeremonyState, ParticipantId};

/// Core error type
#[derive(Error, Debug)]
pub enum LdError {
    #[error("The roster is empty: import or enter participants before starting the ceremony")]
    EmptyRoster,

    #[error("No awards configured: add at least one award before starting the ceremony")]
    NoAwards,

    #[error("Cannot {action} while the ceremony is in {state}")]
    InvalidTransition {
        state: CeremonyState,
        action: &'static str,
    },

    #[error("Unknown award: {0}")]
    UnknownAward(AwardId),

    #[error("Duplicate participant id: {0}")]
    DuplicateParticipant(ParticipantId),

    #[error("Duplicate award id: {0}")]
    DuplicateAward(AwardId),

    #[error("Award {award} already has {winners} winners, target cannot drop to {target}")]
    TargetBelowWinners {
        award: AwardId,
        winners: usize,
        target: u32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LdError {
    /// Shorthand for a rejected state transition
    pub fn transition(state: CeremonyState, action: &'static str) -> Self {
        Self::InvalidTransition { state, action }
    }

    /// Whether the operator can fix this without restarting the session
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Serialization(_))
    }
}

/// Result type alias
pub type LdResult<T> = Result<T, LdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_roster_message_is_user_facing() {
        let msg = LdError::EmptyRoster.to_string();
        assert!(msg.contains("roster"));
        assert!(LdError::EmptyRoster.is_recoverable());
    }

    #[test]
    fn test_transition_message() {
        let err = LdError::transition(CeremonyState::Drawing, "exit the ceremony");
        assert_eq!(
            err.to_string(),
            "Cannot exit the ceremony while the ceremony is in Drawing"
        );
    }
}
