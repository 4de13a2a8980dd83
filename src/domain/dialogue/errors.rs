//! Error types for the dialogue domain.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DialogueState;

/// The four pieces of information a trip search needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Destination,
    Origin,
    Date,
    Time,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SlotKind::Destination => "destination",
            SlotKind::Origin => "origin",
            SlotKind::Date => "date",
            SlotKind::Time => "time",
        };
        f.write_str(s)
    }
}

/// Conversational failures.
///
/// All of them are absorbed by the dialogue manager and turned into a
/// clarification or retry prompt. None of them ends a session.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SlotFailure {
    /// The model completion lacked the required delimiters.
    #[error("no {slot} could be extracted from the model completion")]
    ExtractionFailure { slot: SlotKind },

    /// An extracted date or time does not parse.
    #[error("{slot} '{raw}' is not valid, expected {expected}")]
    ValidationFailure {
        slot: SlotKind,
        raw: String,
        expected: &'static str,
    },

    /// Neither resolution tier produced a directory stop.
    #[error("no stop found for '{name}'")]
    StopNotFound { name: String },

    /// Geocoding failed or returned nothing. Callers treat it like `StopNotFound`.
    #[error("geocoding unavailable for '{name}'")]
    GeocodeUnavailable { name: String },

    /// The trip service answered with a non-success status or could not be reached.
    #[error("trip service failure: {reason}")]
    TripServiceFailure { reason: String },
}

impl SlotFailure {
    pub fn extraction(slot: SlotKind) -> Self {
        Self::ExtractionFailure { slot }
    }

    pub fn validation(slot: SlotKind, raw: impl Into<String>, expected: &'static str) -> Self {
        Self::ValidationFailure {
            slot,
            raw: raw.into(),
            expected,
        }
    }
}

/// Violations of the session's slot invariants.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("slot {0} is already filled")]
    SlotAlreadyFilled(SlotKind),

    #[error("slot {slot} cannot be filled while {state}")]
    OutOfOrder { slot: SlotKind, state: DialogueState },
}
