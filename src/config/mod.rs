//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `TRANSIT_GUIDE` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use transit_guide::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod database;
mod dialogue;
mod error;
mod geocoding;
mod server;
mod trip_service;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use dialogue::DialogueConfig;
pub use error::{ConfigError, ValidationError};
pub use geocoding::GeocodingConfig;
pub use server::{Environment, ServerConfig};
pub use trip_service::TripServiceConfig;

use serde::Deserialize;

use crate::application::handlers::DialogueSettings;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// GTFS stop database (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Language model used for extraction and replies
    #[serde(default)]
    pub ai: AiConfig,

    /// Nominatim geocoder
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// OJP trip planner
    #[serde(default)]
    pub trip_service: TripServiceConfig,

    #[serde(default)]
    pub dialogue: DialogueConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `TRANSIT_GUIDE__*` variables:
    ///
    /// - `TRANSIT_GUIDE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TRANSIT_GUIDE__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or a value
    /// cannot be parsed into its expected type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TRANSIT_GUIDE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.ai.validate()?;
        self.geocoding.validate()?;
        self.trip_service.validate()?;
        self.dialogue.validate()?;

        // every call of a turn must fit inside one request
        let turn_secs = self.dialogue.turn_budget_secs();
        if self.server.request_timeout_secs <= turn_secs {
            return Err(ValidationError::RequestTimeoutBelowTurn {
                request_secs: self.server.request_timeout_secs,
                turn_secs,
            });
        }
        Ok(())
    }

    /// Settings for the dialogue handlers
    pub fn dialogue_settings(&self) -> DialogueSettings {
        self.dialogue.settings(self.ai.temperature)
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
