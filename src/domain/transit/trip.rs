//! Trip queries built from a completed dialogue.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::Stop;

/// Wire format of the departure timestamp sent to the trip service.
pub const DEPARTURE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Everything needed to ask the trip service for itineraries.
///
/// Only constructed once all four dialogue slots are filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripQuery {
    pub origin: Stop,
    pub destination: Stop,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl TripQuery {
    pub fn new(origin: Stop, destination: Stop, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            origin,
            destination,
            date,
            time,
        }
    }

    /// Date and time slots combined into one instant.
    pub fn departure(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Departure rendered for the trip service.
    ///
    /// The wall-clock value is sent unchanged with a `Z` suffix, which is what
    /// the service expects from this client.
    pub fn departure_timestamp(&self) -> String {
        self.departure().format(DEPARTURE_TIMESTAMP_FORMAT).to_string()
    }
}
