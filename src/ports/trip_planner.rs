//! Trip Planner Port - Itinerary requests against the journey planner.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::transit::{Itinerary, StopId};

/// What the planner is asked for. Built from a [`crate::domain::transit::TripQuery`]
/// once both stops carry directory identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRequest {
    pub origin_id: StopId,
    pub origin_name: String,
    pub destination_id: StopId,
    pub destination_name: String,
    /// Departure as sent on the wire, `YYYY-MM-DDTHH:MM:SSZ`.
    pub departure: String,
}

/// Parsed planner answer.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    /// In the order the planner returned them. May be empty.
    pub itineraries: Vec<Itinerary>,
}

/// Trip planner errors. Each carries the upstream diagnostic for logging.
#[derive(Debug, thiserror::Error)]
pub enum TripServiceError {
    #[error("Error: {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("trip service unavailable: {0}")]
    Unavailable(String),

    #[error("trip service timed out")]
    Timeout,

    #[error("could not encode trip request: {0}")]
    Encoding(String),
}

/// Port for the journey planner.
#[async_trait]
pub trait TripPlanner: Send + Sync {
    async fn plan(&self, request: &TripRequest) -> Result<TripPlan, TripServiceError>;
}
