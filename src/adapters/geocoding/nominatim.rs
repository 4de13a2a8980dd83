//! Nominatim geocoder.
//!
//! Sends `GET /search?q=...&format=json&limit=1` with a country bias and a
//! response language, and reads `lat`/`lon` of the first hit. Nominatim
//! returns both as strings.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::transit::Coordinates;
use crate::ports::{GeocodeError, Geocoder};

/// Configuration for the Nominatim geocoder.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// ISO 3166-1 alpha-2 codes, comma separated.
    pub country_codes: String,
    pub language: String,
    /// Nominatim's usage policy requires an identifying agent.
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            country_codes: "ch".to_string(),
            language: "fr".to_string(),
            user_agent: "transit-guide".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

pub struct NominatimGeocoder {
    config: NominatimConfig,
    client: Client,
}

impl NominatimGeocoder {
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodeError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.base_url.trim_end_matches('/'))
    }

    fn query_params<'a>(&'a self, query: &'a str) -> [(&'static str, &'a str); 5] {
        [
            ("q", query),
            ("format", "json"),
            ("limit", "1"),
            ("countrycodes", self.config.country_codes.as_str()),
            ("accept-language", self.config.language.as_str()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Reads the first hit of a Nominatim search response.
fn first_hit(places: &[NominatimPlace]) -> Result<Option<Coordinates>, GeocodeError> {
    let Some(place) = places.first() else {
        return Ok(None);
    };
    let lat: f64 = place
        .lat
        .trim()
        .parse()
        .map_err(|_| GeocodeError::Parse(format!("latitude '{}'", place.lat)))?;
    let lon: f64 = place
        .lon
        .trim()
        .parse()
        .map_err(|_| GeocodeError::Parse(format!("longitude '{}'", place.lon)))?;
    Coordinates::new(lat, lon)
        .map(Some)
        .map_err(|e| GeocodeError::Parse(e.to_string()))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(self.search_url())
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodeError::Timeout
                } else {
                    GeocodeError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), query, "Nominatim rejected request");
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Parse(e.to_string()))?;

        let hit = first_hit(&places)?;
        tracing::debug!(query, found = hit.is_some(), "Nominatim lookup");
        Ok(hit)
    }
}
