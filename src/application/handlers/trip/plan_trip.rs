//! PlanTrip command handler.
//!
//! Direct itinerary search between two named stops, outside any dialogue.
//! Unknown stops are a hard not-found.

use std::sync::Arc;

use serde::Serialize;

use super::{TripSearch, TripSearchError};
use crate::domain::dialogue::extraction::{parse_date, parse_time, DATE_HINT, TIME_HINT};
use crate::domain::dialogue::FieldValue;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::transit::{describe_all, Itinerary};
use crate::ports::TripServiceError;

#[derive(Debug, Clone)]
pub struct PlanTripCommand {
    pub origin_name: String,
    pub destination_name: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanTripResult {
    pub itineraries: Vec<Itinerary>,
    /// One text per itinerary, in planner order.
    pub descriptions: Vec<String>,
}

pub struct PlanTripHandler {
    search: Arc<TripSearch>,
}

impl PlanTripHandler {
    pub fn new(search: Arc<TripSearch>) -> Self {
        Self { search }
    }

    pub async fn handle(&self, cmd: PlanTripCommand) -> Result<PlanTripResult, DomainError> {
        let date = match parse_date(&cmd.date) {
            FieldValue::Valid(date) => date,
            _ => {
                return Err(DomainError::validation(
                    "date",
                    format!("'{}' is not a date, expected {}", cmd.date, DATE_HINT),
                ))
            }
        };
        let time = match parse_time(&cmd.time) {
            FieldValue::Valid(time) => time,
            _ => {
                return Err(DomainError::validation(
                    "time",
                    format!("'{}' is not a time, expected {}", cmd.time, TIME_HINT),
                ))
            }
        };

        let itineraries = self
            .search
            .search_by_names(&cmd.origin_name, &cmd.destination_name, date.and_time(time))
            .await
            .map_err(into_domain_error)?;

        Ok(PlanTripResult {
            descriptions: describe_all(&itineraries),
            itineraries,
        })
    }
}

fn into_domain_error(err: TripSearchError) -> DomainError {
    match err {
        TripSearchError::StopNotFound(name) => DomainError::stop_not_found(name),
        TripSearchError::Directory(e) => {
            tracing::error!(error = %e, "Stop directory failed during trip search");
            DomainError::new(ErrorCode::DatabaseError, e.to_string())
        }
        TripSearchError::Service(TripServiceError::Timeout) => {
            DomainError::new(ErrorCode::Timeout, "trip service timed out")
        }
        TripSearchError::Service(e) => {
            tracing::warn!(error = %e, "Trip service failure");
            DomainError::new(ErrorCode::TripServiceFailure, e.to_string())
        }
    }
}
