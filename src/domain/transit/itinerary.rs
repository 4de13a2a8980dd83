//! Itineraries returned by the trip service.
//!
//! Upstream data is frequently partial. Every leg field therefore has a
//! sentinel value instead of being optional, and nothing in here can fail.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Sentinel for any leg field the upstream response omitted.
pub const UNKNOWN: &str = "Unknown";

/// Display format for scheduled times.
const SERVICE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// One board-to-alight segment on a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub boarding_stop: String,
    pub boarding_time: String,
    pub alighting_stop: String,
    pub alighting_time: String,
    pub line_name: String,
    pub headsign: String,
}

impl Default for Leg {
    fn default() -> Self {
        Self {
            boarding_stop: UNKNOWN.to_string(),
            boarding_time: UNKNOWN.to_string(),
            alighting_stop: UNKNOWN.to_string(),
            alighting_time: UNKNOWN.to_string(),
            line_name: UNKNOWN.to_string(),
            headsign: UNKNOWN.to_string(),
        }
    }
}

impl Leg {
    pub fn describe(&self) -> String {
        format!(
            "Take line {} (towards {}) from {} at {}, then get off at {} at {}.",
            self.line_name,
            self.headsign,
            self.boarding_stop,
            self.boarding_time,
            self.alighting_stop,
            self.alighting_time
        )
    }
}

/// One complete trip option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub legs: Vec<Leg>,
}

impl Itinerary {
    pub fn new(legs: Vec<Leg>) -> Self {
        Self { legs }
    }

    /// Single-line description of the itinerary, legs in order.
    ///
    /// `position` is 1-based and only used for the heading.
    pub fn describe(&self, position: usize) -> String {
        let mut parts = Vec::with_capacity(self.legs.len() + 1);
        parts.push(format!("Trip {}:", position));
        parts.extend(self.legs.iter().map(Leg::describe));
        parts.join(" ")
    }
}

/// Describes each itinerary in order, numbering from 1.
pub fn describe_all(itineraries: &[Itinerary]) -> Vec<String> {
    itineraries
        .iter()
        .enumerate()
        .map(|(i, itinerary)| itinerary.describe(i + 1))
        .collect()
}

/// Formats a scheduled time such as `2025-03-01T08:15:00Z` for display.
///
/// Values that are not RFC 3339 are returned trimmed but otherwise untouched.
pub fn format_service_time(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return UNKNOWN.to_string();
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.naive_local().format(SERVICE_TIME_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}
