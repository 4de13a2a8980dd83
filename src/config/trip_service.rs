//! Trip planning service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::{check_http_url, ValidationError};

/// OJP endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct TripServiceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer token, also the prefix of the requestor reference
    pub api_key: Option<String>,

    #[serde(default = "default_requestor_suffix")]
    pub requestor_suffix: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl TripServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_http_url(&self.endpoint, "trip_service.endpoint")?;
        if self.api_key.as_ref().map_or(true, |k| k.trim().is_empty()) {
            return Err(ValidationError::MissingRequired(
                "TRANSIT_GUIDE__TRIP_SERVICE__API_KEY",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("trip_service.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for TripServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            requestor_suffix: default_requestor_suffix(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.opentransportdata.swiss/ojp2020".to_string()
}

fn default_requestor_suffix() -> String {
    "_prod".to_string()
}

fn default_timeout() -> u64 {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_required() {
        assert_eq!(
            TripServiceConfig::default().validate(),
            Err(ValidationError::MissingRequired(
                "TRANSIT_GUIDE__TRIP_SERVICE__API_KEY"
            ))
        );
    }

    #[test]
    fn configured_service_is_valid() {
        let config = TripServiceConfig {
            api_key: Some("ojp-key".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.requestor_suffix, "_prod");
        assert_eq!(config.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = TripServiceConfig {
            api_key: Some("ojp-key".to_string()),
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
