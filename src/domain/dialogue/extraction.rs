//! Parsing of model completions into slot candidates.
//!
//! The model is asked to wrap a place name or a date between two `#` and a
//! time between two `$`. Only the presence and position of those delimiters
//! matter here. When structured output is enabled the completion is first
//! read as a JSON object; anything that does not parse falls back to the
//! delimiter contract.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

/// Wraps place names and dates.
pub const HASH: char = '#';
/// Wraps times.
pub const DOLLAR: char = '$';

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATE_HINT: &str = "YYYY-MM-DD";
pub const TIME_HINT: &str = "HH:MM:SS";

/// Returns the text after the first `delimiter`, up to the second one or the
/// end of the completion. `None` when the delimiter does not occur.
pub fn between_delimiters(completion: &str, delimiter: char) -> Option<&str> {
    let (_, rest) = completion.split_once(delimiter)?;
    Some(match rest.split_once(delimiter) {
        Some((inner, _)) => inner,
        None => rest,
    })
}

/// Extracts a place-name candidate from a delimited completion.
///
/// An empty candidate counts as no candidate at all.
pub fn extract_place(completion: &str) -> Option<String> {
    between_delimiters(completion, HASH)
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(str::to_string)
}

/// Outcome of reading one field from a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<T> {
    /// The completion did not contain the field.
    Missing,
    /// The field was present but did not parse. Holds the raw text.
    Invalid(String),
    Valid(T),
}

/// Date and time read from a single completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeCandidate {
    pub date: FieldValue<NaiveDate>,
    pub time: FieldValue<NaiveTime>,
}

/// Parses a strict `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> FieldValue<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return FieldValue::Missing;
    }
    if raw.len() != DATE_HINT.len() {
        return FieldValue::Invalid(raw.to_string());
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => FieldValue::Valid(date),
        Err(_) => FieldValue::Invalid(raw.to_string()),
    }
}

/// Parses a strict `HH:MM:SS` time.
pub fn parse_time(raw: &str) -> FieldValue<NaiveTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return FieldValue::Missing;
    }
    if raw.len() != TIME_HINT.len() {
        return FieldValue::Invalid(raw.to_string());
    }
    match NaiveTime::parse_from_str(raw, TIME_FORMAT) {
        Ok(time) => FieldValue::Valid(time),
        Err(_) => FieldValue::Invalid(raw.to_string()),
    }
}

/// Reads the date from `#...#` and the time from `$...$`.
pub fn extract_date_time(completion: &str) -> DateTimeCandidate {
    DateTimeCandidate {
        date: between_delimiters(completion, HASH).map_or(FieldValue::Missing, parse_date),
        time: between_delimiters(completion, DOLLAR).map_or(FieldValue::Missing, parse_time),
    }
}

#[derive(Debug, Deserialize)]
struct PlaceObject {
    place: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DateTimeObject {
    date: Option<String>,
    time: Option<String>,
}

/// Strips a surrounding markdown code fence, which some models add.
fn unfence(completion: &str) -> &str {
    let trimmed = completion.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Structured place extraction with delimiter fallback.
pub fn extract_place_structured(completion: &str) -> Option<String> {
    match serde_json::from_str::<PlaceObject>(unfence(completion)) {
        Ok(object) => object
            .place
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
        Err(_) => extract_place(completion),
    }
}

/// Structured date/time extraction with delimiter fallback.
pub fn extract_date_time_structured(completion: &str) -> DateTimeCandidate {
    match serde_json::from_str::<DateTimeObject>(unfence(completion)) {
        Ok(object) => DateTimeCandidate {
            date: object.date.as_deref().map_or(FieldValue::Missing, parse_date),
            time: object.time.as_deref().map_or(FieldValue::Missing, parse_time),
        },
        Err(_) => extract_date_time(completion),
    }
}
