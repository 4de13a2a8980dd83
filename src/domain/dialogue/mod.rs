//! Dialogue domain - session slots, state derivation, completion parsing.

mod errors;
pub mod extraction;
mod outcome;
pub mod prompts;
mod session;
mod state;

pub use errors::{SessionError, SlotFailure, SlotKind};
pub use extraction::{DateTimeCandidate, FieldValue};
pub use outcome::{FieldReport, TurnOutcome};
pub use session::{PlaceSlot, Role, Session, Slots, TranscriptEntry};
pub use state::DialogueState;
