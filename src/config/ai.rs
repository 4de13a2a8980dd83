//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::{check_http_url, ValidationError};

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Chat completion model
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL, for proxies and compatible endpoints
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature for replies
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_openai() {
            return Err(ValidationError::MissingRequired(
                "TRANSIT_GUIDE__AI__OPENAI_API_KEY",
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("TRANSIT_GUIDE__AI__MODEL"));
        }
        check_http_url(&self.base_url, "ai.base_url")?;
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("ai.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AiConfig {
        AiConfig {
            openai_api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 2);
        assert!(!config.has_openai());
    }

    #[test]
    fn test_validation_requires_key() {
        assert_eq!(
            AiConfig::default().validate(),
            Err(ValidationError::MissingRequired(
                "TRANSIT_GUIDE__AI__OPENAI_API_KEY"
            ))
        );

        let blank = AiConfig {
            openai_api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_validation_temperature_range() {
        let config = AiConfig {
            temperature: 2.5,
            ..configured()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTemperature));
    }

    #[test]
    fn test_validation_base_url() {
        let config = AiConfig {
            base_url: "api.openai.com".to_string(),
            ..configured()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidUrl("ai.base_url"))
        );
    }
}
