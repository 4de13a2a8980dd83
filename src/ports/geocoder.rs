//! Geocoder Port - Free-text place to coordinates.

use async_trait::async_trait;

use crate::domain::transit::Coordinates;

/// Geocoding errors.
///
/// Callers in the dialogue treat every variant like "no result".
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),

    #[error("geocoding service returned status {status}")]
    Status { status: u16 },

    #[error("unreadable geocoding response: {0}")]
    Parse(String),

    #[error("geocoding timed out")]
    Timeout,
}

/// Port for address lookups.
///
/// Country bias and response language are adapter configuration.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for `query`, or `None` when the service knows nothing.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}
