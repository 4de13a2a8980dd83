//! Two-tier stop resolution.
//!
//! Tier 1 is an exact, case-insensitive name match in the stop directory.
//! Tier 2 geocodes the candidate and takes the directory stop nearest to
//! the returned point. A stop is never invented.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::dialogue::SlotFailure;
use crate::domain::transit::{Coordinates, ResolvedStop, Stop};
use crate::ports::{GeocodeError, Geocoder, StopDirectory, StopDirectoryError};

pub struct StopResolver {
    directory: Arc<dyn StopDirectory>,
    geocoder: Arc<dyn Geocoder>,
    call_timeout: Duration,
}

impl StopResolver {
    pub fn new(
        directory: Arc<dyn StopDirectory>,
        geocoder: Arc<dyn Geocoder>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            geocoder,
            call_timeout,
        }
    }

    pub async fn resolve(&self, candidate: &str) -> Result<ResolvedStop, SlotFailure> {
        let candidate = candidate.trim();

        match self.exact(candidate).await {
            Ok(Some(stop)) => {
                tracing::debug!(candidate, stop = %stop.name, tier = "exact", "Stop resolved");
                return Ok(ResolvedStop::exact(candidate, stop));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(candidate, tier = "exact", error = %e, "Stop directory lookup failed");
            }
        }

        let point = match self.geocode(candidate).await {
            Ok(Some(point)) => point,
            Ok(None) => {
                return Err(SlotFailure::StopNotFound {
                    name: candidate.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!(candidate, tier = "geocode", error = %e, "Geocoding failed");
                return Err(SlotFailure::GeocodeUnavailable {
                    name: candidate.to_string(),
                });
            }
        };

        match self.nearest(point).await {
            Ok(Some(stop)) => {
                tracing::debug!(candidate, stop = %stop.name, tier = "nearest", "Stop resolved");
                Ok(ResolvedStop::nearest(candidate, stop, point))
            }
            Ok(None) => Err(SlotFailure::StopNotFound {
                name: candidate.to_string(),
            }),
            Err(e) => {
                tracing::warn!(candidate, tier = "nearest", error = %e, "Stop directory lookup failed");
                Err(SlotFailure::StopNotFound {
                    name: candidate.to_string(),
                })
            }
        }
    }

    /// Geocode followed by nearest stop, without the exact-name tier.
    ///
    /// A geocoder failure reads as "nothing nearby"; directory failures are
    /// returned so callers can tell an outage from an unknown place.
    pub async fn nearest_to_place(&self, text: &str) -> Result<Option<Stop>, StopDirectoryError> {
        let text = text.trim();
        let point = match self.geocode(text).await {
            Ok(Some(point)) => point,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::warn!(query = text, error = %e, "Geocoding failed");
                return Ok(None);
            }
        };

        self.nearest(point).await.map_err(|e| {
            tracing::warn!(query = text, error = %e, "Stop directory lookup failed");
            e
        })
    }

    async fn exact(&self, name: &str) -> Result<Option<Stop>, StopDirectoryError> {
        tokio::time::timeout(self.call_timeout, self.directory.find_by_name(name))
            .await
            .map_err(|_| StopDirectoryError::Timeout)?
    }

    async fn geocode(&self, text: &str) -> Result<Option<Coordinates>, GeocodeError> {
        tokio::time::timeout(self.call_timeout, self.geocoder.geocode(text))
            .await
            .map_err(|_| GeocodeError::Timeout)?
    }

    async fn nearest(&self, point: Coordinates) -> Result<Option<Stop>, StopDirectoryError> {
        tokio::time::timeout(self.call_timeout, self.directory.nearest_to(point))
            .await
            .map_err(|_| StopDirectoryError::Timeout)?
    }
}
