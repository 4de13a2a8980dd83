//! ResolveNearest query handler.
//!
//! Free text to the name of the closest stop, via geocoding.

use std::sync::Arc;

use super::StopResolver;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::StopDirectoryError;

#[derive(Debug, Clone)]
pub struct ResolveNearestQuery {
    pub text: String,
}

pub struct ResolveNearestHandler {
    resolver: Arc<StopResolver>,
}

impl ResolveNearestHandler {
    pub fn new(resolver: Arc<StopResolver>) -> Self {
        Self { resolver }
    }

    /// Canonical stop name, or `None` when nothing near the place is known.
    pub async fn handle(&self, query: ResolveNearestQuery) -> Result<Option<String>, DomainError> {
        if query.text.trim().is_empty() {
            return Err(DomainError::new(ErrorCode::EmptyField, "query cannot be empty")
                .with_detail("field", "query"));
        }

        match self.resolver.nearest_to_place(&query.text).await {
            Ok(stop) => Ok(stop.map(|s| s.name)),
            Err(StopDirectoryError::Timeout) => Err(DomainError::new(
                ErrorCode::Timeout,
                "stop directory timed out",
            )),
            Err(e) => Err(DomainError::new(ErrorCode::DatabaseError, e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::geocoding::MockGeocoder;
    use crate::adapters::stops::InMemoryStopDirectory;
    use crate::domain::transit::{Coordinates, Stop, StopId};
    use crate::ports::StopDirectory;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StalledDirectory {
        timeout: bool,
    }

    #[async_trait]
    impl StopDirectory for StalledDirectory {
        async fn find_by_name(&self, _name: &str) -> Result<Option<Stop>, StopDirectoryError> {
            Ok(None)
        }

        async fn nearest_to(&self, _point: Coordinates) -> Result<Option<Stop>, StopDirectoryError> {
            if self.timeout {
                Err(StopDirectoryError::Timeout)
            } else {
                Err(StopDirectoryError::Query("pool exhausted".to_string()))
            }
        }

        async fn search(&self, _fragment: &str, _limit: usize) -> Result<Vec<String>, StopDirectoryError> {
            Ok(Vec::new())
        }
    }

    fn failing_handler(timeout: bool) -> ResolveNearestHandler {
        let geocoder = MockGeocoder::new().with_place("Bundesplatz", Coordinates::new(46.946, 7.444).unwrap());
        let resolver = StopResolver::new(
            Arc::new(StalledDirectory { timeout }),
            Arc::new(geocoder),
            Duration::from_secs(1),
        );
        ResolveNearestHandler::new(Arc::new(resolver))
    }

    fn handler(geocoder: MockGeocoder) -> ResolveNearestHandler {
        let directory = InMemoryStopDirectory::with_stops([Stop::new(
            StopId::new("8507000").unwrap(),
            "Bern",
            Coordinates::new(46.9488, 7.4391).unwrap(),
        )]);
        let resolver = StopResolver::new(Arc::new(directory), Arc::new(geocoder), Duration::from_secs(1));
        ResolveNearestHandler::new(Arc::new(resolver))
    }

    fn query(text: &str) -> ResolveNearestQuery {
        ResolveNearestQuery {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn returns_nearest_stop_name() {
        let geocoder = MockGeocoder::new().with_place("Bundesplatz", Coordinates::new(46.946, 7.444).unwrap());
        let name = handler(geocoder).handle(query("Bundesplatz")).await.unwrap();
        assert_eq!(name.as_deref(), Some("Bern"));
    }

    #[tokio::test]
    async fn unknown_place_is_absent() {
        let name = handler(MockGeocoder::new()).handle(query("Nowhere")).await.unwrap();
        assert!(name.is_none());
    }

    #[tokio::test]
    async fn geocoder_outage_is_absent() {
        let name = handler(MockGeocoder::new().unavailable())
            .handle(query("Bern"))
            .await
            .unwrap();
        assert!(name.is_none());
    }

    #[tokio::test]
    async fn blank_query_is_rejected() {
        let err = handler(MockGeocoder::new()).handle(query("  ")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyField);
    }

    #[tokio::test]
    async fn directory_outage_is_a_database_error() {
        let err = failing_handler(false)
            .handle(query("Bundesplatz"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn directory_timeout_is_reported_as_timeout() {
        let err = failing_handler(true)
            .handle(query("Bundesplatz"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Timeout);
    }
}
