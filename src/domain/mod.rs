//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, state machine, errors)
//! - `transit` - Stops, trip queries and itineraries
//! - `dialogue` - Session slots, dialogue state and completion parsing

pub mod dialogue;
pub mod foundation;
pub mod transit;
