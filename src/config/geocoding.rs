//! Geocoding service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::{check_http_url, ValidationError};

/// Nominatim settings
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Country bias, comma-separated ISO 3166-1 alpha-2 codes
    #[serde(default = "default_country_codes")]
    pub country_codes: String,

    /// Preferred response language
    #[serde(default = "default_language")]
    pub language: String,

    /// Identifying User-Agent sent with each request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_http_url(&self.base_url, "geocoding.base_url")?;
        let codes_ok = self.country_codes.split(',').all(|code| {
            let code = code.trim();
            code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
        });
        if !codes_ok {
            return Err(ValidationError::InvalidCountryCode);
        }
        if self.user_agent.trim().is_empty() {
            return Err(ValidationError::MissingRequired(
                "TRANSIT_GUIDE__GEOCODING__USER_AGENT",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("geocoding.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            country_codes: default_country_codes(),
            language: default_language(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_country_codes() -> String {
    "ch".to_string()
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_user_agent() -> String {
    concat!("transit-guide/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GeocodingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.country_codes, "ch");
        assert!(config.user_agent.starts_with("transit-guide/"));
    }

    #[test]
    fn several_country_codes_are_accepted() {
        let config = GeocodingConfig {
            country_codes: "ch, fr,de".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_country_codes_are_rejected() {
        let config = GeocodingConfig {
            country_codes: "che".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidCountryCode));
    }

    #[test]
    fn blank_user_agent_is_rejected() {
        let config = GeocodingConfig {
            user_agent: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
