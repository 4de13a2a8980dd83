//! In-memory StopDirectory for tests and local runs.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use crate::domain::transit::{Coordinates, Stop};
use crate::ports::{StopDirectory, StopDirectoryError};

/// Holds a fixed list of stops.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStopDirectory {
    stops: Arc<RwLock<Vec<Stop>>>,
}

impl InMemoryStopDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stops(stops: impl IntoIterator<Item = Stop>) -> Self {
        Self {
            stops: Arc::new(RwLock::new(stops.into_iter().collect())),
        }
    }

    pub fn insert(&self, stop: Stop) {
        self.stops.write().unwrap().push(stop);
    }

    pub fn len(&self) -> usize {
        self.stops.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StopDirectory for InMemoryStopDirectory {
    async fn find_by_name(&self, name: &str) -> Result<Option<Stop>, StopDirectoryError> {
        let stops = self.stops.read().unwrap();
        Ok(stops.iter().find(|s| s.matches_name(name)).cloned())
    }

    async fn nearest_to(&self, point: Coordinates) -> Result<Option<Stop>, StopDirectoryError> {
        let stops = self.stops.read().unwrap();
        Ok(stops
            .iter()
            .min_by(|a, b| {
                a.coordinates
                    .distance_km(&point)
                    .total_cmp(&b.coordinates.distance_km(&point))
            })
            .cloned())
    }

    async fn search(&self, fragment: &str, limit: usize) -> Result<Vec<String>, StopDirectoryError> {
        let needle = fragment.trim().to_lowercase();
        let stops = self.stops.read().unwrap();
        let names: BTreeSet<&str> = stops
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .map(|s| s.name.as_str())
            .collect();
        Ok(names.into_iter().take(limit).map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transit::StopId;

    fn stop(id: &str, name: &str, lat: f64, lon: f64) -> Stop {
        Stop::new(StopId::new(id).unwrap(), name, Coordinates::new(lat, lon).unwrap())
    }

    fn directory() -> InMemoryStopDirectory {
        InMemoryStopDirectory::with_stops([
            stop("1", "Genève, Cornavin", 46.2101, 6.1423),
            stop("2", "Genève, Plainpalais", 46.1980, 6.1420),
            stop("3", "Lausanne, gare", 46.5167, 6.6291),
            stop("4", "Genève, Cornavin", 46.2102, 6.1424),
        ])
    }

    #[tokio::test]
    async fn exact_match_ignores_case() {
        let found = directory().find_by_name("genève, CORNAVIN").await.unwrap();
        assert_eq!(found.unwrap().id.as_str(), "1");
        assert!(directory().find_by_name("Genève").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn nearest_picks_closest_stop() {
        let point = Coordinates::new(46.199, 6.142).unwrap();
        let found = directory().nearest_to(point).await.unwrap().unwrap();
        assert_eq!(found.name, "Genève, Plainpalais");
    }

    #[tokio::test]
    async fn nearest_on_empty_directory_is_none() {
        let point = Coordinates::new(46.0, 6.0).unwrap();
        assert!(InMemoryStopDirectory::new().nearest_to(point).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_returns_unique_sorted_names() {
        let names = directory().search("genève", 10).await.unwrap();
        assert_eq!(names, vec!["Genève, Cornavin", "Genève, Plainpalais"]);
        assert_eq!(directory().search("gen", 1).await.unwrap().len(), 1);
    }
}
