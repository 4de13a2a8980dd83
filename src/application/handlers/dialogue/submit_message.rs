//! SubmitMessage command handler.
//!
//! Runs one dialogue turn: termination check, slot collection for the
//! current state, the trip search once all slots are filled, and the reply.
//! The session stays locked for the whole turn, so turns of one session run
//! one after the other while different sessions proceed concurrently.

use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveTime};
use thiserror::Error;

use super::{DialogueSettings, ReplyComposer, SlotExtractor};
use crate::application::handlers::stops::StopResolver;
use crate::application::handlers::trip::TripSearch;
use crate::domain::dialogue::{
    DialogueState, FieldReport, FieldValue, PlaceSlot, Session, SlotFailure, SlotKind, TurnOutcome,
};
use crate::domain::dialogue::extraction::{DATE_HINT, TIME_HINT};
use crate::domain::foundation::{SessionKey, TurnId};
use crate::domain::transit::{describe_all, Stop, TripQuery};
use crate::ports::{AIProvider, RequestMetadata, SessionHandle, SessionStore, SessionStoreError};

/// A fresh handle is fetched again when the previous one was evicted
/// between lookup and lock.
const MAX_ACQUIRE_ATTEMPTS: usize = 3;

/// Command to submit one user message to a dialogue.
#[derive(Debug, Clone)]
pub struct SubmitMessageCommand {
    pub session_key: SessionKey,
    pub text: String,
}

impl SubmitMessageCommand {
    pub fn new(session_key: SessionKey, text: impl Into<String>) -> Self {
        Self {
            session_key,
            text: text.into(),
        }
    }
}

/// Result of a dialogue turn.
#[derive(Debug, Clone)]
pub struct SubmitMessageResult {
    pub reply_text: String,
    pub session_key: SessionKey,
    /// State after the turn. A finished or ended dialogue reports
    /// `AwaitingDestination`.
    pub state: DialogueState,
    /// Name of the turn outcome, for logs and clients.
    pub outcome: &'static str,
}

/// Errors that can occur when submitting a message.
///
/// Conversational failures never show up here. They become replies.
#[derive(Debug, Error)]
pub enum SubmitMessageError {
    #[error("Validation error: message text cannot be empty")]
    EmptyText,

    #[error("Session store error: {0}")]
    Store(#[from] SessionStoreError),

    #[error("Session {0} could not be acquired")]
    SessionUnavailable(SessionKey),

    #[error("Session {0} was removed while its turn was running")]
    SessionRemoved(SessionKey),
}

enum SlotWrite {
    Place(PlaceSlot, Stop),
    Date(NaiveDate),
    Time(NaiveTime),
}

/// Outcome of the collection step plus the slot values it validated.
struct Step {
    outcome: TurnOutcome,
    writes: Vec<SlotWrite>,
}

impl Step {
    fn clarify(outcome: TurnOutcome) -> Self {
        Self {
            outcome,
            writes: Vec::new(),
        }
    }
}

fn extraction_purpose(slot: PlaceSlot) -> &'static str {
    match slot {
        PlaceSlot::Destination => "extract_destination",
        PlaceSlot::Origin => "extract_origin",
    }
}

/// Report and optional write for one date/time field.
fn field_report<T>(
    key: &SessionKey,
    kind: SlotKind,
    hint: &'static str,
    value: FieldValue<T>,
    already_set: bool,
) -> (FieldReport, Option<T>) {
    if already_set {
        return (FieldReport::AlreadySet, None);
    }
    match value {
        FieldValue::Valid(value) => (FieldReport::Written, Some(value)),
        FieldValue::Invalid(raw) => {
            let failure = SlotFailure::validation(kind, raw, hint);
            tracing::info!(session_id = %key, failure = %failure, "Slot value rejected");
            (FieldReport::Invalid, None)
        }
        FieldValue::Missing => (FieldReport::Missing, None),
    }
}

/// Handler for SubmitMessage commands.
pub struct SubmitMessageHandler {
    store: Arc<dyn SessionStore>,
    extractor: SlotExtractor,
    resolver: Arc<StopResolver>,
    trips: Arc<TripSearch>,
    composer: ReplyComposer,
    settings: Arc<DialogueSettings>,
}

impl SubmitMessageHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        ai: Arc<dyn AIProvider>,
        resolver: Arc<StopResolver>,
        trips: Arc<TripSearch>,
        settings: Arc<DialogueSettings>,
    ) -> Self {
        Self {
            store,
            extractor: SlotExtractor::new(Arc::clone(&ai), Arc::clone(&settings)),
            resolver,
            trips,
            composer: ReplyComposer::new(ai, Arc::clone(&settings)),
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitMessageCommand,
    ) -> Result<SubmitMessageResult, SubmitMessageError> {
        let text = cmd.text.trim();
        if text.is_empty() {
            return Err(SubmitMessageError::EmptyText);
        }

        let turn_id = TurnId::new();
        for attempt in 1..=MAX_ACQUIRE_ATTEMPTS {
            let handle = self.store.get_or_create(&cmd.session_key).await?;
            if let Some(result) = self.run_turn(&handle, &cmd.session_key, text, turn_id).await? {
                return Ok(result);
            }
            tracing::debug!(
                session_id = %cmd.session_key,
                attempt,
                "Session evicted before its turn started"
            );
        }

        Err(SubmitMessageError::SessionUnavailable(cmd.session_key))
    }

    /// `None` when the handle was evicted before the lock was taken.
    async fn run_turn(
        &self,
        handle: &SessionHandle,
        key: &SessionKey,
        text: &str,
        turn_id: TurnId,
    ) -> Result<Option<SubmitMessageResult>, SubmitMessageError> {
        let mut session = handle.lock().await;
        if handle.is_evicted() {
            return Ok(None);
        }

        session.touch();
        session.push_user(text);
        let metadata = |purpose: &'static str| RequestMetadata::new(key.clone(), turn_id, purpose);

        if self.settings.is_termination(text) {
            let outcome = TurnOutcome::Farewell;
            let reply = self
                .composer
                .compose(metadata("farewell"), session.transcript(), &outcome, session.slots())
                .await;
            if !handle.is_evicted() {
                self.store.delete(key).await?;
            }
            tracing::info!(session_id = %key, "Dialogue ended by user");
            return Ok(Some(SubmitMessageResult {
                reply_text: reply,
                session_key: key.clone(),
                state: DialogueState::AwaitingDestination,
                outcome: outcome.name(),
            }));
        }

        let from = session.state();
        let mut step_outcome = None;
        if from.is_collecting() {
            let step = match PlaceSlot::for_state(from) {
                Some(slot) => {
                    self.place_step(metadata(extraction_purpose(slot)), &session, slot, text)
                        .await
                }
                None => {
                    self.date_time_step(metadata("extract_date_time"), &session, text)
                        .await
                }
            };
            self.ensure_live(handle, key)?;
            self.apply(&mut session, step.writes);
            step_outcome = Some(step.outcome);
        }

        tracing::info!(
            session_id = %key,
            from = from.as_str(),
            state = session.state().as_str(),
            "Dialogue turn processed"
        );

        let outcome = match session.trip_query() {
            Some(query) => self.search_trip(handle, key, &mut session, &query).await?,
            None => step_outcome.unwrap_or(TurnOutcome::DateTimeProgress {
                date: FieldReport::Missing,
                time: FieldReport::Missing,
            }),
        };

        let reply = self
            .composer
            .compose(metadata("reply"), session.transcript(), &outcome, session.slots())
            .await;
        self.ensure_live(handle, key)?;

        if matches!(outcome, TurnOutcome::TripFound { .. }) {
            session.reset();
            tracing::info!(session_id = %key, "Trip delivered, session reset");
        } else {
            session.push_assistant(reply.clone());
        }

        Ok(Some(SubmitMessageResult {
            reply_text: reply,
            session_key: key.clone(),
            state: session.state(),
            outcome: outcome.name(),
        }))
    }

    fn ensure_live(&self, handle: &SessionHandle, key: &SessionKey) -> Result<(), SubmitMessageError> {
        if handle.is_evicted() {
            tracing::warn!(session_id = %key, "Session removed mid-turn, results discarded");
            return Err(SubmitMessageError::SessionRemoved(key.clone()));
        }
        Ok(())
    }

    async fn place_step(
        &self,
        metadata: RequestMetadata,
        session: &Session,
        slot: PlaceSlot,
        text: &str,
    ) -> Step {
        let candidate = self
            .extractor
            .extract_place(metadata, session.transcript(), slot, text)
            .await;
        let Some(candidate) = candidate else {
            let failure = SlotFailure::extraction(slot.kind());
            tracing::info!(session_id = %session.key(), failure = %failure, "Nothing extracted");
            return Step::clarify(TurnOutcome::PlaceNotExtracted { slot });
        };

        match self.resolver.resolve(&candidate).await {
            Ok(resolved) => Step {
                writes: vec![SlotWrite::Place(slot, resolved.stop.clone())],
                outcome: TurnOutcome::PlaceResolved { slot, resolved },
            },
            Err(failure) => {
                tracing::info!(session_id = %session.key(), failure = %failure, "Place not resolved");
                Step::clarify(TurnOutcome::PlaceNotResolved { slot, candidate })
            }
        }
    }

    async fn date_time_step(
        &self,
        metadata: RequestMetadata,
        session: &Session,
        text: &str,
    ) -> Step {
        let now = Local::now().naive_local();
        let candidate = self
            .extractor
            .extract_date_time(metadata, session.transcript(), text, now)
            .await;

        let key = session.key();
        let slots = session.slots();
        let (date, date_value) =
            field_report(key, SlotKind::Date, DATE_HINT, candidate.date, slots.date.is_some());
        let (time, time_value) =
            field_report(key, SlotKind::Time, TIME_HINT, candidate.time, slots.time.is_some());

        let writes = date_value
            .map(SlotWrite::Date)
            .into_iter()
            .chain(time_value.map(SlotWrite::Time))
            .collect();

        Step {
            outcome: TurnOutcome::DateTimeProgress { date, time },
            writes,
        }
    }

    fn apply(&self, session: &mut Session, writes: Vec<SlotWrite>) {
        for write in writes {
            let written = match write {
                SlotWrite::Place(slot, stop) => session.fill_place(slot, stop),
                SlotWrite::Date(date) => session.fill_date(date),
                SlotWrite::Time(time) => session.fill_time(time),
            };
            if let Err(e) = written {
                tracing::warn!(session_id = %session.key(), error = %e, "Slot write refused");
            }
        }
    }

    /// Runs the single trip search of this turn.
    async fn search_trip(
        &self,
        handle: &SessionHandle,
        key: &SessionKey,
        session: &mut Session,
        query: &TripQuery,
    ) -> Result<TurnOutcome, SubmitMessageError> {
        let found = self.trips.search(query).await;
        self.ensure_live(handle, key)?;

        let reason = match found {
            Ok(itineraries) if !itineraries.is_empty() => {
                tracing::info!(
                    session_id = %key,
                    itineraries = itineraries.len(),
                    "Trip search succeeded"
                );
                return Ok(TurnOutcome::TripFound {
                    descriptions: describe_all(&itineraries),
                });
            }
            Ok(_) => "no itinerary returned".to_string(),
            Err(e) => e.to_string(),
        };

        let failure = SlotFailure::TripServiceFailure { reason };
        let failure_count = session.record_trip_failure();
        let cap_reached = failure_count >= self.settings.max_trip_failures;
        tracing::warn!(
            session_id = %key,
            failure_count,
            cap_reached,
            failure = %failure,
            "Trip search failed"
        );

        Ok(TurnOutcome::TripFailed {
            failure_count,
            cap_reached,
        })
    }
}
