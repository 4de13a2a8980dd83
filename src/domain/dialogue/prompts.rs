//! Instructions sent to the language model and the static fallback replies.
//!
//! Extraction instructions fix the delimiter contract. Reply instructions
//! only set tone and content; the model sees the full transcript as well.

use chrono::NaiveDateTime;

use super::{FieldReport, PlaceSlot, Slots, TurnOutcome};
use crate::domain::transit::ResolutionMethod;

pub const DEFAULT_WELCOME: &str = "Bonjour, je suis votre assistant des transports publics suisses. \
Pour recommencer la conversation, écrivez 'STOP'. Où désirez-vous aller ?";

pub const DEFAULT_REPLY_LANGUAGE: &str = "French";

fn place_label(slot: PlaceSlot) -> &'static str {
    match slot {
        PlaceSlot::Destination => "destination",
        PlaceSlot::Origin => "departure point",
    }
}

/// Asks the model to wrap the place name between two `#`.
pub fn place_extraction(slot: PlaceSlot, user_input: &str) -> String {
    format!(
        "The user probably mentioned a {label} in: \"{input}\". \
         Write the stop name between two # so it can be extracted. \
         Stops are usually written as the town or municipality, a comma, then the stop: #Town, Stop#. \
         Anything outside the # is ignored. \
         If it looks like an address, a monument or a specific place, put as much detail as possible \
         between the # (above all the town) so the nearest stop can be found.",
        label = place_label(slot),
        input = user_input,
    )
}

/// Structured variant of [`place_extraction`].
pub fn place_extraction_structured(slot: PlaceSlot, user_input: &str) -> String {
    format!(
        "The user probably mentioned a {label} in: \"{input}\". \
         Answer only with a JSON object {{\"place\": string or null}}. \
         Stops are usually written as \"Town, Stop\". \
         For an address, a monument or a specific place, include the town. \
         Use null when no place is mentioned.",
        label = place_label(slot),
        input = user_input,
    )
}

/// Asks for the date between two `#` and the time between two `$`.
///
/// `now` lets the model resolve relative expressions such as "tomorrow".
pub fn date_time_extraction(user_input: &str, now: NaiveDateTime) -> String {
    format!(
        "The user mentioned a date and a time in: \"{input}\". \
         For reference, today is {date} and the current time is {time}. \
         Write the date between two # and the time between two $. \
         You may write only the date and/or the time, nothing else is needed. \
         The date format is YYYY-MM-DD and the time format is HH:MM:SS.",
        input = user_input,
        date = now.format("%Y-%m-%d"),
        time = now.format("%H:%M:%S"),
    )
}

/// Structured variant of [`date_time_extraction`].
pub fn date_time_extraction_structured(user_input: &str, now: NaiveDateTime) -> String {
    format!(
        "The user mentioned a date and a time in: \"{input}\". \
         For reference, today is {date} and the current time is {time}. \
         Answer only with a JSON object {{\"date\": \"YYYY-MM-DD\" or null, \"time\": \"HH:MM:SS\" or null}}.",
        input = user_input,
        date = now.format("%Y-%m-%d"),
        time = now.format("%H:%M:%S"),
    )
}

/// Appended to every reply instruction.
pub fn language_directive(language: &str) -> String {
    format!(" Always answer in {}.", language)
}

fn next_step(slot: PlaceSlot) -> &'static str {
    match slot {
        PlaceSlot::Destination => "continue the conversation by asking for the departure point",
        PlaceSlot::Origin => "ask for the date and time of departure",
    }
}

/// Tone and content instruction for the reply to `outcome`.
pub fn reply_instruction(outcome: &TurnOutcome, slots: &Slots, termination_keyword: &str) -> String {
    match outcome {
        TurnOutcome::PlaceResolved { slot, resolved } => match &resolved.method {
            ResolutionMethod::ExactName => format!(
                "The user chose {stop} as {label}. Tell them the stop is selected and {next}.",
                stop = resolved.stop.name,
                label = place_label(*slot),
                next = next_step(*slot),
            ),
            ResolutionMethod::NearestToGeocode { .. } => format!(
                "The user mentioned {candidate} as {label}. No stop has exactly that name, \
                 but a coordinate search found the nearest stop: {stop}. \
                 Tell them this stop is selected and {next}.",
                candidate = resolved.candidate,
                stop = resolved.stop.name,
                label = place_label(*slot),
                next = next_step(*slot),
            ),
        },
        TurnOutcome::PlaceNotExtracted { slot } => format!(
            "The {label} the user mentioned could not be identified. \
             Ask them to be more specific or to try another stop.",
            label = place_label(*slot),
        ),
        TurnOutcome::PlaceNotResolved { slot, candidate } => format!(
            "No stop was found for the {label} \"{candidate}\", even with a coordinate search. \
             Ask the user to be more specific, to look up the exact stop name, or to try another stop.",
            label = place_label(*slot),
            candidate = candidate,
        ),
        TurnOutcome::DateTimeProgress { date, time } => date_time_instruction(*date, *time, slots),
        TurnOutcome::TripFound { descriptions } => format!(
            "Here are the trip details: {details}. Make them easy to read by formatting them in Markdown \
             (headings, bold, italics). Propose at most 3 trips. Give clear and precise information \
             (departure time, arrival time, connections). Be polite and engaging, and say that this \
             search is finished and the user can ask for a new trip.",
            details = descriptions.join(" "),
        ),
        TurnOutcome::TripFailed { cap_reached: false, .. } => {
            "An error occurred while retrieving the trip details. \
             Ask the user whether they want to try again or stop."
                .to_string()
        }
        TurnOutcome::TripFailed { cap_reached: true, failure_count } => format!(
            "Retrieving the trip details has now failed {count} times. \
             Tell the user the trip service appears to be unavailable and suggest writing \
             '{keyword}' to start over, or trying again later.",
            count = failure_count,
            keyword = termination_keyword,
        ),
        TurnOutcome::Farewell => "Thank the user for their visit and tell them they can start \
             a new trip request at any time. Say goodbye."
            .to_string(),
    }
}

fn date_time_instruction(date: FieldReport, time: FieldReport, slots: &Slots) -> String {
    let date_text = slots.date.map(|d| d.format("%Y-%m-%d").to_string());
    let time_text = slots.time.map(|t| t.format("%H:%M:%S").to_string());

    match (date, time, date_text, time_text) {
        (d, t, Some(date), Some(time)) if d.is_filled() && t.is_filled() => format!(
            "The user gave the date {} and the time {}. Give a short summary of the trip.",
            date, time
        ),
        (_, FieldReport::Invalid, Some(date), _) => format!(
            "The user gave the date {}, but the time was not understood. Ask for a valid time (HH:MM:SS).",
            date
        ),
        (FieldReport::Invalid, _, _, Some(time)) => format!(
            "The user gave the time {}, but the date was not understood. Ask for a valid date.",
            time
        ),
        (_, _, Some(date), None) => format!(
            "The user gave the date {}. Now ask for the exact departure time.",
            date
        ),
        (_, _, None, Some(time)) => format!(
            "The user gave the time {}. Now ask for the exact date.",
            time
        ),
        _ => "The date or the time was not understood. Ask the user to rephrase.".to_string(),
    }
}

/// Plain reply used when the language model cannot be reached.
pub fn fallback_reply(outcome: &TurnOutcome, slots: &Slots, termination_keyword: &str) -> String {
    match outcome {
        TurnOutcome::PlaceResolved { slot, resolved } => match slot {
            PlaceSlot::Destination => format!(
                "Destination set to {}. Where are you leaving from?",
                resolved.stop.name
            ),
            PlaceSlot::Origin => format!(
                "Departure set to {}. When do you want to leave (date and time)?",
                resolved.stop.name
            ),
        },
        TurnOutcome::PlaceNotExtracted { slot } | TurnOutcome::PlaceNotResolved { slot, .. } => {
            format!(
                "I could not find that {}. Could you give a more precise stop name?",
                place_label(*slot)
            )
        }
        TurnOutcome::DateTimeProgress { date, time } => {
            match (date.is_filled(), time.is_filled()) {
                (true, true) => match (slots.date, slots.time) {
                    (Some(d), Some(t)) => format!(
                        "Departure on {} at {}.",
                        d.format("%Y-%m-%d"),
                        t.format("%H:%M:%S")
                    ),
                    _ => "Date and time noted.".to_string(),
                },
                (true, false) => "Date noted. At what time (HH:MM:SS)?".to_string(),
                (false, true) => "Time noted. On which date (YYYY-MM-DD)?".to_string(),
                (false, false) => {
                    "I did not understand the date or the time. Could you rephrase?".to_string()
                }
            }
        }
        TurnOutcome::TripFound { descriptions } => {
            let shown: Vec<&str> = descriptions.iter().take(3).map(String::as_str).collect();
            format!("{}\n\nThis search is finished. Where would you like to go next?", shown.join("\n\n"))
        }
        TurnOutcome::TripFailed { cap_reached: false, .. } => {
            "The trip details could not be retrieved. Would you like to try again?".to_string()
        }
        TurnOutcome::TripFailed { cap_reached: true, .. } => format!(
            "The trip service appears to be unavailable. Write '{}' to start over or try again later.",
            termination_keyword
        ),
        TurnOutcome::Farewell => {
            "Thank you for your visit. Come back any time to plan a trip. Goodbye!".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transit::{Coordinates, ResolvedStop, Stop, StopId};
    use chrono::{NaiveDate, NaiveTime};

    fn stop(name: &str) -> Stop {
        Stop::new(StopId::new("8501008").unwrap(), name, Coordinates::new(46.21, 6.14).unwrap())
    }

    #[test]
    fn place_extraction_mentions_hash_contract() {
        let text = place_extraction(PlaceSlot::Destination, "to Geneva");
        assert!(text.contains("between two #"));
        assert!(text.contains("#Town, Stop#"));
        assert!(text.contains("to Geneva"));
    }

    #[test]
    fn date_time_extraction_includes_now() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();
        let text = date_time_extraction("tomorrow at 8", now);
        assert!(text.contains("2025-03-01"));
        assert!(text.contains("07:30:00"));
        assert!(text.contains("between two $"));
    }

    #[test]
    fn nearest_match_reply_names_both_candidate_and_stop() {
        let outcome = TurnOutcome::PlaceResolved {
            slot: PlaceSlot::Destination,
            resolved: ResolvedStop::nearest(
                "Genève",
                stop("Genève, Cornavin"),
                Coordinates::new(46.2, 6.14).unwrap(),
            ),
        };
        let text = reply_instruction(&outcome, &Slots::default(), "stop");
        assert!(text.contains("Genève, Cornavin"));
        assert!(text.contains("mentioned Genève"));
        assert!(text.contains("departure point"));
    }

    #[test]
    fn invalid_time_asks_for_valid_time() {
        let slots = Slots {
            date: NaiveDate::from_ymd_opt(2025, 3, 1),
            ..Slots::default()
        };
        let outcome = TurnOutcome::DateTimeProgress {
            date: FieldReport::Written,
            time: FieldReport::Invalid,
        };
        let text = reply_instruction(&outcome, &slots, "stop");
        assert!(text.contains("2025-03-01"));
        assert!(text.contains("valid time"));
    }

    #[test]
    fn complete_date_time_gives_summary() {
        let slots = Slots {
            date: NaiveDate::from_ymd_opt(2025, 3, 1),
            time: NaiveTime::from_hms_opt(8, 0, 0),
            ..Slots::default()
        };
        let outcome = TurnOutcome::DateTimeProgress {
            date: FieldReport::AlreadySet,
            time: FieldReport::Written,
        };
        assert!(reply_instruction(&outcome, &slots, "stop").contains("summary"));
    }

    #[test]
    fn capped_failure_suggests_termination_keyword() {
        let outcome = TurnOutcome::TripFailed {
            failure_count: 3,
            cap_reached: true,
        };
        assert!(reply_instruction(&outcome, &Slots::default(), "stop").contains("'stop'"));
        assert!(fallback_reply(&outcome, &Slots::default(), "stop").contains("'stop'"));
    }

    #[test]
    fn trip_fallback_shows_at_most_three_trips() {
        let outcome = TurnOutcome::TripFound {
            descriptions: (1..=5).map(|i| format!("Trip {}:", i)).collect(),
        };
        let text = fallback_reply(&outcome, &Slots::default(), "stop");
        assert!(text.contains("Trip 3:"));
        assert!(!text.contains("Trip 4:"));
    }
}
