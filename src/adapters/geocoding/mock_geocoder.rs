//! Mock geocoder for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::transit::Coordinates;
use crate::ports::{GeocodeError, Geocoder};

/// Answers from a fixed table keyed by lower-cased query.
#[derive(Debug, Clone, Default)]
pub struct MockGeocoder {
    places: HashMap<String, Coordinates>,
    unavailable: bool,
    delay: Duration,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, query: &str, point: Coordinates) -> Self {
        self.places.insert(query.trim().to_lowercase(), point);
        self
    }

    /// Every lookup fails as if the service were down.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.calls.lock().unwrap().push(query.to_string());
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        if self.unavailable {
            return Err(GeocodeError::Unavailable("mock geocoder is down".to_string()));
        }
        Ok(self.places.get(&query.trim().to_lowercase()).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let point = Coordinates::new(46.2, 6.14).unwrap();
        let geocoder = MockGeocoder::new().with_place("Genève", point);

        assert_eq!(geocoder.geocode("GENÈVE ").await.unwrap(), Some(point));
        assert_eq!(geocoder.geocode("Zürich").await.unwrap(), None);
        assert_eq!(geocoder.calls().len(), 2);
    }

    #[tokio::test]
    async fn unavailable_geocoder_errors() {
        let geocoder = MockGeocoder::new().unavailable();
        assert!(geocoder.geocode("Bern").await.is_err());
    }
}
