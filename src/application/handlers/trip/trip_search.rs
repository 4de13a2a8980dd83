//! Itinerary search shared by the dialogue and the direct trip surface.
//!
//! Both stops are looked up by name in the stop directory right before the
//! request, so the planner always receives current directory identifiers.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::domain::transit::{Itinerary, Stop, TripQuery, DEPARTURE_TIMESTAMP_FORMAT};
use crate::ports::{StopDirectory, StopDirectoryError, TripPlanner, TripRequest, TripServiceError};

#[derive(Debug, thiserror::Error)]
pub enum TripSearchError {
    #[error("Stop '{0}' not found")]
    StopNotFound(String),

    #[error(transparent)]
    Directory(#[from] StopDirectoryError),

    #[error(transparent)]
    Service(#[from] TripServiceError),
}

pub struct TripSearch {
    directory: Arc<dyn StopDirectory>,
    planner: Arc<dyn TripPlanner>,
    call_timeout: Duration,
}

impl TripSearch {
    pub fn new(
        directory: Arc<dyn StopDirectory>,
        planner: Arc<dyn TripPlanner>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            planner,
            call_timeout,
        }
    }

    /// Itineraries for a completed dialogue.
    pub async fn search(&self, query: &TripQuery) -> Result<Vec<Itinerary>, TripSearchError> {
        self.search_by_names(&query.origin.name, &query.destination.name, query.departure())
            .await
    }

    /// Itineraries between two stops given by exact name.
    ///
    /// May be empty when the planner knows no connection.
    pub async fn search_by_names(
        &self,
        origin_name: &str,
        destination_name: &str,
        departure: NaiveDateTime,
    ) -> Result<Vec<Itinerary>, TripSearchError> {
        let origin = self.lookup(origin_name).await?;
        let destination = self.lookup(destination_name).await?;

        let request = TripRequest {
            origin_id: origin.id,
            origin_name: origin.name,
            destination_id: destination.id,
            destination_name: destination.name,
            departure: departure.format(DEPARTURE_TIMESTAMP_FORMAT).to_string(),
        };

        let plan = tokio::time::timeout(self.call_timeout, self.planner.plan(&request))
            .await
            .map_err(|_| TripServiceError::Timeout)??;

        tracing::debug!(
            origin = %request.origin_name,
            destination = %request.destination_name,
            departure = %request.departure,
            itineraries = plan.itineraries.len(),
            "Trip plan received"
        );
        Ok(plan.itineraries)
    }

    async fn lookup(&self, name: &str) -> Result<Stop, TripSearchError> {
        tokio::time::timeout(self.call_timeout, self.directory.find_by_name(name.trim()))
            .await
            .map_err(|_| StopDirectoryError::Timeout)??
            .ok_or_else(|| TripSearchError::StopNotFound(name.trim().to_string()))
    }
}
