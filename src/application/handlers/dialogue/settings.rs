//! Runtime parameters of the dialogue manager.

use std::time::Duration;

use crate::domain::dialogue::prompts::DEFAULT_REPLY_LANGUAGE;

/// Sequential external calls a single turn can make, each bounded by
/// `call_timeout`: extraction, exact match, geocode, nearest, reply on a
/// place turn; extraction, two stop lookups, trip search, reply on the last.
pub const MAX_CALLS_PER_TURN: u32 = 5;

#[derive(Debug, Clone)]
pub struct DialogueSettings {
    /// Matched case-insensitively anywhere in the user's message.
    pub termination_keywords: Vec<String>,
    pub reply_language: String,
    pub extraction_max_tokens: u32,
    pub reply_max_tokens: u32,
    /// Budget for the itinerary reply, which is much longer.
    pub trip_reply_max_tokens: u32,
    pub temperature: f32,
    /// Upper bound for every external call made during a turn.
    pub call_timeout: Duration,
    /// Failed trip searches before the retry reply says the service looks down.
    pub max_trip_failures: u32,
    /// Ask for JSON when the provider supports it.
    pub structured_extraction: bool,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            termination_keywords: vec!["stop".to_string()],
            reply_language: DEFAULT_REPLY_LANGUAGE.to_string(),
            extraction_max_tokens: 150,
            reply_max_tokens: 150,
            trip_reply_max_tokens: 800,
            temperature: 0.7,
            call_timeout: Duration::from_secs(20),
            max_trip_failures: 3,
            structured_extraction: false,
        }
    }
}

impl DialogueSettings {
    /// True when `text` contains any termination keyword, ignoring case.
    pub fn is_termination(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.termination_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .any(|k| !k.is_empty() && text.contains(&k))
    }

    /// The keyword suggested to users who want to start over.
    pub fn primary_keyword(&self) -> &str {
        self.termination_keywords
            .first()
            .map(String::as_str)
            .unwrap_or("stop")
    }
}
