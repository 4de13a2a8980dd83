//! Dialogue state machine.
//!
//! The state is never stored. It is derived each turn from which slots are
//! still empty, with the fixed precedence destination, origin, date/time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// What the dialogue needs next.
///
/// - `AwaitingDestination`: no destination yet
/// - `AwaitingOrigin`: destination known, origin missing
/// - `AwaitingDateTime`: both stops known, date and/or time missing
/// - `Ready`: all four slots filled, a trip search runs this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    #[default]
    AwaitingDestination,
    AwaitingOrigin,
    AwaitingDateTime,
    Ready,
}

impl DialogueState {
    /// Derives the state from slot occupancy.
    pub fn derive(
        has_destination: bool,
        has_origin: bool,
        has_date: bool,
        has_time: bool,
    ) -> Self {
        if !has_destination {
            Self::AwaitingDestination
        } else if !has_origin {
            Self::AwaitingOrigin
        } else if !has_date || !has_time {
            Self::AwaitingDateTime
        } else {
            Self::Ready
        }
    }

    /// Returns true while a slot still has to be collected.
    pub fn is_collecting(&self) -> bool {
        !matches!(self, Self::Ready)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingDestination => "awaiting_destination",
            Self::AwaitingOrigin => "awaiting_origin",
            Self::AwaitingDateTime => "awaiting_date_time",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for DialogueState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DialogueState::*;
        matches!(
            (self, target),
            // A turn that fills nothing stays put
            (AwaitingDestination, AwaitingDestination)
                | (AwaitingOrigin, AwaitingOrigin)
                | (AwaitingDateTime, AwaitingDateTime)
                // Failed trip searches keep the slots
                | (Ready, Ready)
                // Forward, one slot group at a time
                | (AwaitingDestination, AwaitingOrigin)
                | (AwaitingOrigin, AwaitingDateTime)
                | (AwaitingDateTime, Ready)
                // Successful search or explicit reset
                | (AwaitingOrigin, AwaitingDestination)
                | (AwaitingDateTime, AwaitingDestination)
                | (Ready, AwaitingDestination)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DialogueState::*;
        match self {
            AwaitingDestination => vec![AwaitingDestination, AwaitingOrigin],
            AwaitingOrigin => vec![AwaitingOrigin, AwaitingDateTime, AwaitingDestination],
            AwaitingDateTime => vec![AwaitingDateTime, Ready, AwaitingDestination],
            Ready => vec![Ready, AwaitingDestination],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DialogueState; 4] = [
        DialogueState::AwaitingDestination,
        DialogueState::AwaitingOrigin,
        DialogueState::AwaitingDateTime,
        DialogueState::Ready,
    ];

    #[test]
    fn destination_takes_precedence_over_everything() {
        assert_eq!(
            DialogueState::derive(false, true, true, true),
            DialogueState::AwaitingDestination
        );
    }

    #[test]
    fn origin_follows_destination() {
        assert_eq!(
            DialogueState::derive(true, false, true, true),
            DialogueState::AwaitingOrigin
        );
    }

    #[test]
    fn partial_datetime_is_still_awaiting() {
        assert_eq!(
            DialogueState::derive(true, true, true, false),
            DialogueState::AwaitingDateTime
        );
        assert_eq!(
            DialogueState::derive(true, true, false, true),
            DialogueState::AwaitingDateTime
        );
    }

    #[test]
    fn all_slots_means_ready() {
        assert_eq!(DialogueState::derive(true, true, true, true), DialogueState::Ready);
        assert!(!DialogueState::Ready.is_collecting());
    }

    #[test]
    fn cannot_skip_forward() {
        assert!(DialogueState::AwaitingDestination
            .transition_to(DialogueState::AwaitingDateTime)
            .is_err());
        assert!(DialogueState::AwaitingOrigin
            .transition_to(DialogueState::Ready)
            .is_err());
    }

    #[test]
    fn no_state_is_terminal() {
        for state in ALL {
            assert!(!state.is_terminal(), "{:?} should not be terminal", state);
        }
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for state in ALL {
            for target in state.valid_transitions() {
                assert!(state.can_transition_to(&target));
            }
        }
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&DialogueState::AwaitingDateTime).unwrap();
        assert_eq!(json, "\"awaiting_date_time\"");
        assert_eq!(DialogueState::AwaitingDateTime.to_string(), "awaiting_date_time");
    }
}
