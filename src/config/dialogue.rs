//! Dialogue manager configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::handlers::{DialogueSettings, MAX_CALLS_PER_TURN};
use crate::domain::dialogue::prompts::{DEFAULT_REPLY_LANGUAGE, DEFAULT_WELCOME};

/// Idle sessions never outlive a week.
const MAX_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Conversation behaviour and budgets
#[derive(Debug, Clone, Deserialize)]
pub struct DialogueConfig {
    /// Keywords that end a conversation (comma-separated)
    #[serde(default = "default_termination_keywords")]
    pub termination_keywords: String,

    /// First assistant message of every new session
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// Language the assistant answers in
    #[serde(default = "default_reply_language")]
    pub reply_language: String,

    #[serde(default = "default_extraction_max_tokens")]
    pub extraction_max_tokens: u32,

    #[serde(default = "default_reply_max_tokens")]
    pub reply_max_tokens: u32,

    #[serde(default = "default_trip_reply_max_tokens")]
    pub trip_reply_max_tokens: u32,

    /// Upper bound for a single external call within a turn
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    #[serde(default = "default_max_trip_failures")]
    pub max_trip_failures: u32,

    /// Sessions untouched for this long are evicted
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// How often the idle sweeper runs
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Request JSON output for slot extraction when the model supports it
    #[serde(default)]
    pub structured_extraction: bool,
}

impl DialogueConfig {
    pub fn termination_keywords_list(&self) -> Vec<String> {
        self.termination_keywords
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Worst-case wall time of one dialogue turn, in seconds.
    pub fn turn_budget_secs(&self) -> u64 {
        self.call_timeout_secs.saturating_mul(u64::from(MAX_CALLS_PER_TURN))
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Builds the handler settings; temperature comes from the AI section.
    pub fn settings(&self, temperature: f32) -> DialogueSettings {
        DialogueSettings {
            termination_keywords: self.termination_keywords_list(),
            reply_language: self.reply_language.clone(),
            extraction_max_tokens: self.extraction_max_tokens,
            reply_max_tokens: self.reply_max_tokens,
            trip_reply_max_tokens: self.trip_reply_max_tokens,
            temperature,
            call_timeout: self.call_timeout(),
            max_trip_failures: self.max_trip_failures,
            structured_extraction: self.structured_extraction,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.termination_keywords_list().is_empty() {
            return Err(ValidationError::NoTerminationKeyword);
        }
        if self.welcome_message.trim().is_empty() {
            return Err(ValidationError::MissingRequired(
                "TRANSIT_GUIDE__DIALOGUE__WELCOME_MESSAGE",
            ));
        }
        if self.extraction_max_tokens == 0 {
            return Err(ValidationError::InvalidTokenBudget("extraction"));
        }
        if self.reply_max_tokens == 0 {
            return Err(ValidationError::InvalidTokenBudget("reply"));
        }
        if self.trip_reply_max_tokens == 0 {
            return Err(ValidationError::InvalidTokenBudget("trip reply"));
        }
        if self.call_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("dialogue.call_timeout_secs"));
        }
        if self.session_ttl_secs == 0 || self.session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ValidationError::InvalidTimeout("dialogue.session_ttl_secs"));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidTimeout("dialogue.sweep_interval_secs"));
        }
        if self.max_trip_failures == 0 {
            return Err(ValidationError::InvalidFailureCap);
        }
        Ok(())
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            termination_keywords: default_termination_keywords(),
            welcome_message: default_welcome_message(),
            reply_language: default_reply_language(),
            extraction_max_tokens: default_extraction_max_tokens(),
            reply_max_tokens: default_reply_max_tokens(),
            trip_reply_max_tokens: default_trip_reply_max_tokens(),
            call_timeout_secs: default_call_timeout(),
            max_trip_failures: default_max_trip_failures(),
            session_ttl_secs: default_session_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            structured_extraction: false,
        }
    }
}

fn default_termination_keywords() -> String {
    "stop".to_string()
}

fn default_welcome_message() -> String {
    DEFAULT_WELCOME.to_string()
}

fn default_reply_language() -> String {
    DEFAULT_REPLY_LANGUAGE.to_string()
}

fn default_extraction_max_tokens() -> u32 {
    150
}

fn default_reply_max_tokens() -> u32 {
    150
}

fn default_trip_reply_max_tokens() -> u32 {
    800
}

fn default_call_timeout() -> u64 {
    20
}

fn default_max_trip_failures() -> u32 {
    3
}

fn default_session_ttl() -> u64 {
    30 * 60
}

fn default_sweep_interval() -> u64 {
    60
}
