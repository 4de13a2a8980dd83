//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod dialogue;
pub mod stops;
pub mod trip;

pub use dialogue::{
    DialogueSettings, SubmitMessageCommand, SubmitMessageError, SubmitMessageHandler,
    SubmitMessageResult, MAX_CALLS_PER_TURN,
};
pub use stops::{
    ResolveNearestHandler, ResolveNearestQuery, SearchStopsHandler, SearchStopsQuery,
    StopResolver,
};
pub use trip::{PlanTripCommand, PlanTripHandler, PlanTripResult, TripSearch, TripSearchError};
