//! Dialogue session aggregate.
//!
//! A session owns the four trip slots and the conversation transcript. The
//! dialogue state is derived from slot occupancy, so the only way to move the
//! conversation forward is to fill the slot the current state asks for.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{DialogueState, SessionError, SlotKind};
use crate::domain::foundation::{SessionKey, StateMachine, Timestamp};
use crate::domain::transit::{Stop, TripQuery};

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Which of the two place slots a resolved stop goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceSlot {
    Destination,
    Origin,
}

impl PlaceSlot {
    pub fn kind(&self) -> SlotKind {
        match self {
            PlaceSlot::Destination => SlotKind::Destination,
            PlaceSlot::Origin => SlotKind::Origin,
        }
    }

    /// The place slot the given state collects, if any.
    pub fn for_state(state: DialogueState) -> Option<Self> {
        match state {
            DialogueState::AwaitingDestination => Some(PlaceSlot::Destination),
            DialogueState::AwaitingOrigin => Some(PlaceSlot::Origin),
            _ => None,
        }
    }
}

/// The trip parameters collected so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slots {
    pub destination: Option<Stop>,
    pub origin: Option<Stop>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl Slots {
    pub fn state(&self) -> DialogueState {
        DialogueState::derive(
            self.destination.is_some(),
            self.origin.is_some(),
            self.date.is_some(),
            self.time.is_some(),
        )
    }
}

/// A single user's conversation.
#[derive(Debug, Clone)]
pub struct Session {
    key: SessionKey,
    slots: Slots,
    transcript: Vec<TranscriptEntry>,
    failure_count: u32,
    last_activity: Timestamp,
}

impl Session {
    /// Starts a conversation with the welcome message already in the transcript.
    pub fn new(key: SessionKey, welcome: impl Into<String>) -> Self {
        Self {
            key,
            slots: Slots::default(),
            transcript: vec![TranscriptEntry::assistant(welcome)],
            failure_count: 0,
            last_activity: Timestamp::now(),
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn last_activity(&self) -> Timestamp {
        self.last_activity
    }

    pub fn state(&self) -> DialogueState {
        self.slots.state()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.transcript.push(TranscriptEntry::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.transcript.push(TranscriptEntry::assistant(text));
    }

    /// Writes a resolved stop into the place slot the current state asks for.
    pub fn fill_place(&mut self, slot: PlaceSlot, stop: Stop) -> Result<(), SessionError> {
        match slot {
            PlaceSlot::Destination => self.fill_destination(stop),
            PlaceSlot::Origin => self.fill_origin(stop),
        }
    }

    pub fn fill_destination(&mut self, stop: Stop) -> Result<(), SessionError> {
        self.guard(SlotKind::Destination, self.slots.destination.is_some())?;
        self.slots.destination = Some(stop);
        self.advance(SlotKind::Destination, DialogueState::AwaitingDestination)
    }

    pub fn fill_origin(&mut self, stop: Stop) -> Result<(), SessionError> {
        self.guard(SlotKind::Origin, self.slots.origin.is_some())?;
        self.slots.origin = Some(stop);
        self.advance(SlotKind::Origin, DialogueState::AwaitingOrigin)
    }

    pub fn fill_date(&mut self, date: NaiveDate) -> Result<(), SessionError> {
        self.guard(SlotKind::Date, self.slots.date.is_some())?;
        self.slots.date = Some(date);
        self.advance(SlotKind::Date, DialogueState::AwaitingDateTime)
    }

    pub fn fill_time(&mut self, time: NaiveTime) -> Result<(), SessionError> {
        self.guard(SlotKind::Time, self.slots.time.is_some())?;
        self.slots.time = Some(time);
        self.advance(SlotKind::Time, DialogueState::AwaitingDateTime)
    }

    /// The trip query, once all four slots are filled.
    pub fn trip_query(&self) -> Option<TripQuery> {
        match (
            &self.slots.origin,
            &self.slots.destination,
            self.slots.date,
            self.slots.time,
        ) {
            (Some(origin), Some(destination), Some(date), Some(time)) => Some(TripQuery::new(
                origin.clone(),
                destination.clone(),
                date,
                time,
            )),
            _ => None,
        }
    }

    /// Records a failed trip search. Slots and transcript are left untouched.
    pub fn record_trip_failure(&mut self) -> u32 {
        self.failure_count = self.failure_count.saturating_add(1);
        self.failure_count
    }

    /// Empties the slots and the transcript and clears the failure count.
    ///
    /// The key survives, so the caller can keep using the same session id.
    pub fn reset(&mut self) {
        self.slots = Slots::default();
        self.transcript.clear();
        self.failure_count = 0;
    }

    pub fn touch(&mut self) {
        self.last_activity = Timestamp::now();
    }

    /// True when the last activity is older than `max_idle`.
    pub fn is_idle(&self, now: Timestamp, max_idle: Duration) -> bool {
        self.last_activity.is_before(&now.minus_secs(max_idle.as_secs()))
    }

    fn guard(&self, slot: SlotKind, filled: bool) -> Result<(), SessionError> {
        if filled {
            return Err(SessionError::SlotAlreadyFilled(slot));
        }
        let state = self.state();
        let expected = match slot {
            SlotKind::Destination => state == DialogueState::AwaitingDestination,
            SlotKind::Origin => state == DialogueState::AwaitingOrigin,
            SlotKind::Date | SlotKind::Time => state == DialogueState::AwaitingDateTime,
        };
        if !expected {
            return Err(SessionError::OutOfOrder { slot, state });
        }
        Ok(())
    }

    fn advance(&self, slot: SlotKind, from: DialogueState) -> Result<(), SessionError> {
        from.transition_to(self.state())
            .map(|_| ())
            .map_err(|_| SessionError::OutOfOrder { slot, state: from })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transit::{Coordinates, StopId};

    fn key() -> SessionKey {
        SessionKey::new("abc").unwrap()
    }

    fn stop(name: &str) -> Stop {
        Stop::new(
            StopId::new(format!("id-{}", name)).unwrap(),
            name,
            Coordinates::new(46.2, 6.1).unwrap(),
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn time() -> NaiveTime {
        NaiveTime::from_hms_opt(8, 15, 0).unwrap()
    }

    fn full_session() -> Session {
        let mut session = Session::new(key(), "Hello");
        session.fill_destination(stop("Genève, Cornavin")).unwrap();
        session.fill_origin(stop("Lausanne")).unwrap();
        session.fill_date(date()).unwrap();
        session.fill_time(time()).unwrap();
        session
    }

    #[test]
    fn new_session_starts_with_welcome_message() {
        let session = Session::new(key(), "Where do you want to go?");
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, Role::Assistant);
        assert_eq!(session.state(), DialogueState::AwaitingDestination);
        assert_eq!(session.failure_count(), 0);
    }

    #[test]
    fn slots_fill_in_order() {
        let mut session = Session::new(key(), "Hello");
        session.fill_destination(stop("Bern")).unwrap();
        assert_eq!(session.state(), DialogueState::AwaitingOrigin);
        session.fill_origin(stop("Thun")).unwrap();
        assert_eq!(session.state(), DialogueState::AwaitingDateTime);
        session.fill_time(time()).unwrap();
        assert_eq!(session.state(), DialogueState::AwaitingDateTime);
        session.fill_date(date()).unwrap();
        assert_eq!(session.state(), DialogueState::Ready);
    }

    #[test]
    fn origin_before_destination_is_rejected() {
        let mut session = Session::new(key(), "Hello");
        let err = session.fill_origin(stop("Thun")).unwrap_err();
        assert_eq!(
            err,
            SessionError::OutOfOrder {
                slot: SlotKind::Origin,
                state: DialogueState::AwaitingDestination
            }
        );
        assert!(session.slots().origin.is_none());
    }

    #[test]
    fn date_before_origin_is_rejected() {
        let mut session = Session::new(key(), "Hello");
        session.fill_destination(stop("Bern")).unwrap();
        assert!(session.fill_date(date()).is_err());
        assert!(session.slots().date.is_none());
    }

    #[test]
    fn filled_slot_is_never_overwritten() {
        let mut session = Session::new(key(), "Hello");
        session.fill_destination(stop("Bern")).unwrap();
        let err = session.fill_destination(stop("Basel")).unwrap_err();
        assert_eq!(err, SessionError::SlotAlreadyFilled(SlotKind::Destination));
        assert_eq!(session.slots().destination.as_ref().unwrap().name, "Bern");
    }

    #[test]
    fn filled_date_is_not_overwritten() {
        let mut session = Session::new(key(), "Hello");
        session.fill_destination(stop("Bern")).unwrap();
        session.fill_origin(stop("Thun")).unwrap();
        session.fill_date(date()).unwrap();
        let other = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert!(session.fill_date(other).is_err());
        assert_eq!(session.slots().date, Some(date()));
    }

    #[test]
    fn trip_query_requires_all_slots() {
        let mut session = Session::new(key(), "Hello");
        assert!(session.trip_query().is_none());
        session.fill_destination(stop("Bern")).unwrap();
        assert!(session.trip_query().is_none());

        let query = full_session().trip_query().unwrap();
        assert_eq!(query.origin.name, "Lausanne");
        assert_eq!(query.destination.name, "Genève, Cornavin");
    }

    #[test]
    fn trip_failure_keeps_slots() {
        let mut session = full_session();
        assert_eq!(session.record_trip_failure(), 1);
        assert_eq!(session.record_trip_failure(), 2);
        assert_eq!(session.state(), DialogueState::Ready);
    }

    #[test]
    fn reset_clears_everything_but_the_key() {
        let mut session = full_session();
        session.push_user("hi");
        session.record_trip_failure();
        session.reset();

        assert_eq!(session.key().as_str(), "abc");
        assert_eq!(session.slots(), &Slots::default());
        assert!(session.transcript().is_empty());
        assert_eq!(session.failure_count(), 0);
        assert_eq!(session.state(), DialogueState::AwaitingDestination);
    }

    #[test]
    fn idle_detection_uses_last_activity() {
        let session = Session::new(key(), "Hello");
        let now = Timestamp::now();
        assert!(!session.is_idle(now, Duration::from_secs(60)));

        let later = Timestamp::from_datetime(*now.as_datetime() + chrono::Duration::seconds(120));
        assert!(session.is_idle(later, Duration::from_secs(60)));
    }

    #[test]
    fn huge_idle_limit_never_expires() {
        let session = Session::new(key(), "Hello");
        assert!(!session.is_idle(Timestamp::now(), Duration::from_secs(u64::MAX)));
    }

    #[test]
    fn place_slot_follows_state() {
        assert_eq!(
            PlaceSlot::for_state(DialogueState::AwaitingDestination),
            Some(PlaceSlot::Destination)
        );
        assert_eq!(
            PlaceSlot::for_state(DialogueState::AwaitingOrigin),
            Some(PlaceSlot::Origin)
        );
        assert_eq!(PlaceSlot::for_state(DialogueState::Ready), None);
    }
}
