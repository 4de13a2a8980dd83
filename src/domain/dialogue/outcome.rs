//! Structured results of a dialogue turn.
//!
//! The dialogue manager produces exactly one outcome per turn. The reply
//! composer turns it into natural language.

use serde::Serialize;

use super::PlaceSlot;
use crate::domain::transit::ResolvedStop;

/// What happened to one of the date/time fields this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldReport {
    /// Parsed and written to its slot.
    Written,
    /// The slot was already filled earlier. Nothing changed.
    AlreadySet,
    /// Present in the completion but malformed.
    Invalid,
    /// Not present in the completion.
    Missing,
}

impl FieldReport {
    /// True when the slot holds a value after this turn.
    pub fn is_filled(&self) -> bool {
        matches!(self, FieldReport::Written | FieldReport::AlreadySet)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// A place slot was filled.
    PlaceResolved {
        slot: PlaceSlot,
        resolved: ResolvedStop,
    },
    /// The completion carried no delimited place name.
    PlaceNotExtracted { slot: PlaceSlot },
    /// A candidate was extracted but no directory stop matched.
    PlaceNotResolved { slot: PlaceSlot, candidate: String },
    /// Date/time step result. Covers full, partial and empty extraction.
    DateTimeProgress { date: FieldReport, time: FieldReport },
    /// A trip search returned itineraries. The session has been reset.
    TripFound { descriptions: Vec<String> },
    /// A trip search failed. Slots are kept for a retry.
    TripFailed { failure_count: u32, cap_reached: bool },
    /// The user asked to stop. The session is gone.
    Farewell,
}

impl TurnOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            TurnOutcome::PlaceResolved { .. } => "place_resolved",
            TurnOutcome::PlaceNotExtracted { .. } => "place_not_extracted",
            TurnOutcome::PlaceNotResolved { .. } => "place_not_resolved",
            TurnOutcome::DateTimeProgress { .. } => "date_time_progress",
            TurnOutcome::TripFound { .. } => "trip_found",
            TurnOutcome::TripFailed { .. } => "trip_failed",
            TurnOutcome::Farewell => "farewell",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_outcome_tag() {
        let json = serde_json::to_value(TurnOutcome::TripFailed {
            failure_count: 2,
            cap_reached: false,
        })
        .unwrap();
        assert_eq!(json["outcome"], "trip_failed");
        assert_eq!(json["failure_count"], 2);
    }
}
