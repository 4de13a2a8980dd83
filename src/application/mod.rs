//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The dialogue command mutates session state; the stop and trip queries
//! only read reference data and the trip service.

pub mod handlers;

pub use handlers::{
    // Dialogue
    DialogueSettings, SubmitMessageCommand, SubmitMessageError, SubmitMessageHandler,
    SubmitMessageResult,
    // Stops
    ResolveNearestHandler, ResolveNearestQuery, SearchStopsHandler, SearchStopsQuery,
    StopResolver,
    // Trips
    PlanTripCommand, PlanTripHandler, PlanTripResult, TripSearch, TripSearchError,
};
