//! State machine for a session's turn slot
//!
//! Turn states: Idle → Locked → Idle

pub use parley_common::StateError;
use serde::{Deserialize, Serialize};

/// Whether a session currently has a turn in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TurnState {
    #[default]
    Idle,
    Locked,
}

impl TurnState {
    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [TurnState] {
        match self {
            Self::Idle => &[Self::Locked],
            Self::Locked => &[Self::Idle],
        }
    }
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Locked => write!(f, "locked"),
        }
    }
}

/// Events that trigger turn state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TurnEvent {
    /// A turn was admitted to the session's slot
    Acquire,
    /// The admitted turn finished, successfully or not
    Release,
}

impl std::fmt::Display for TurnEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Acquire => write!(f, "acquire"),
            Self::Release => write!(f, "release"),
        }
    }
}

/// Turn state machine
pub struct TurnStateMachine;

impl TurnStateMachine {
    /// Attempt a state transition
    pub fn transition(current: TurnState, event: TurnEvent) -> Result<TurnState, StateError> {
        match (current, event) {
            (TurnState::Idle, TurnEvent::Acquire) => Ok(TurnState::Locked),
            (TurnState::Locked, TurnEvent::Release) => Ok(TurnState::Idle),
            _ => Err(StateError::InvalidTransition {
                from: current.to_string(),
                event: event.to_string(),
            }),
        }
    }
}
