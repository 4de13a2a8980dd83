//! Trip planner backed by an OJP 1.0 endpoint.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

use super::request::build_trip_request;
use super::response::parse_trip_response;
use crate::ports::{TripPlan, TripPlanner, TripRequest, TripServiceError};

/// Configuration for the OJP trip planner.
#[derive(Debug, Clone)]
pub struct OjpConfig {
    pub endpoint: String,
    api_key: Secret<String>,
    /// Appended to the key to form `RequestorRef`.
    pub requestor_suffix: String,
    pub timeout: Duration,
}

impl OjpConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: Secret::new(api_key.into()),
            requestor_suffix: "_prod".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_requestor_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.requestor_suffix = suffix.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn requestor_ref(&self) -> String {
        format!("{}{}", self.api_key.expose_secret(), self.requestor_suffix)
    }
}

pub struct OjpTripPlanner {
    config: OjpConfig,
    client: Client,
}

impl OjpTripPlanner {
    pub fn new(config: OjpConfig) -> Result<Self, TripServiceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TripServiceError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl TripPlanner for OjpTripPlanner {
    async fn plan(&self, request: &TripRequest) -> Result<TripPlan, TripServiceError> {
        let body = build_trip_request(request, &self.config.requestor_ref())?;

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", "application/xml")
            .bearer_auth(self.config.api_key.expose_secret())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TripServiceError::Timeout
                } else {
                    TripServiceError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TripServiceError::Unavailable(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(TripServiceError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let itineraries = parse_trip_response(&text);
        tracing::debug!(
            origin = %request.origin_id,
            destination = %request.destination_id,
            trips = itineraries.len(),
            "OJP trip response parsed"
        );

        Ok(TripPlan { itineraries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requestor_ref_appends_suffix() {
        let config = OjpConfig::new("https://api.opentransportdata.swiss/ojp2020", "abc");
        assert_eq!(config.requestor_ref(), "abc_prod");
        assert_eq!(config.with_requestor_suffix("_test").requestor_ref(), "abc_test");
    }

    #[test]
    fn debug_output_hides_key() {
        let config = OjpConfig::new("https://example.test", "super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
