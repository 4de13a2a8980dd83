//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address")]
    InvalidAddress,

    #[error("Invalid timeout for {0}")]
    InvalidTimeout(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("Temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("Token budget for {0} must be positive")]
    InvalidTokenBudget(&'static str),

    #[error("At least one termination keyword is required")]
    NoTerminationKeyword,

    #[error("Trip failure cap must be at least 1")]
    InvalidFailureCap,

    #[error("Country codes must be two-letter ISO codes")]
    InvalidCountryCode,

    #[error("server.request_timeout_secs ({request_secs}s) must exceed the worst-case turn ({turn_secs}s)")]
    RequestTimeoutBelowTurn { request_secs: u64, turn_secs: u64 },
}

/// Accepts `http://` and `https://` URLs with a host part.
pub(crate) fn check_http_url(url: &str, field: &'static str) -> Result<(), ValidationError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or(ValidationError::InvalidUrl(field))?;
    if rest.trim_matches('/').is_empty() {
        return Err(ValidationError::InvalidUrl(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_urls_are_accepted() {
        assert!(check_http_url("https://example.org/api", "x").is_ok());
        assert!(check_http_url("http://localhost:8080", "x").is_ok());
    }

    #[test]
    fn other_urls_are_rejected() {
        assert_eq!(
            check_http_url("ftp://example.org", "geocoding.base_url"),
            Err(ValidationError::InvalidUrl("geocoding.base_url"))
        );
        assert!(check_http_url("https://", "x").is_err());
    }
}
