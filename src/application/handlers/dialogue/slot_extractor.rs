//! Model-driven slot extraction.
//!
//! Every failure of the model call (error or timeout) is logged and reported
//! as "nothing extracted", so the dialogue asks the user to rephrase.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::json;

use super::DialogueSettings;
use crate::domain::dialogue::extraction::{
    extract_date_time, extract_date_time_structured, extract_place, extract_place_structured,
};
use crate::domain::dialogue::{prompts, DateTimeCandidate, FieldValue, PlaceSlot, TranscriptEntry};
use crate::ports::{AIProvider, CompletionRequest, RequestMetadata, ResponseSchema};

pub struct SlotExtractor {
    ai: Arc<dyn AIProvider>,
    settings: Arc<DialogueSettings>,
}

fn place_schema() -> ResponseSchema {
    ResponseSchema::new(
        "place",
        json!({
            "type": "object",
            "properties": { "place": { "type": ["string", "null"] } },
            "required": ["place"],
            "additionalProperties": false
        }),
    )
}

fn date_time_schema() -> ResponseSchema {
    ResponseSchema::new(
        "date_time",
        json!({
            "type": "object",
            "properties": {
                "date": { "type": ["string", "null"] },
                "time": { "type": ["string", "null"] }
            },
            "required": ["date", "time"],
            "additionalProperties": false
        }),
    )
}

impl SlotExtractor {
    pub fn new(ai: Arc<dyn AIProvider>, settings: Arc<DialogueSettings>) -> Self {
        Self { ai, settings }
    }

    fn structured(&self) -> bool {
        self.settings.structured_extraction && self.ai.provider_info().supports_structured_output
    }

    /// Raw completion for `instruction`, or `None` when the model could not answer.
    async fn complete(
        &self,
        metadata: RequestMetadata,
        transcript: &[TranscriptEntry],
        instruction: String,
        schema: Option<ResponseSchema>,
    ) -> Option<String> {
        let purpose = metadata.purpose;
        let mut request = CompletionRequest::new(metadata)
            .with_transcript(transcript)
            .with_instruction(instruction)
            .with_max_tokens(self.settings.extraction_max_tokens)
            .with_temperature(self.settings.temperature);
        if let Some(schema) = schema {
            request = request.with_response_schema(schema);
        }

        match tokio::time::timeout(self.settings.call_timeout, self.ai.complete(request)).await {
            Ok(Ok(response)) => Some(response.content),
            Ok(Err(e)) => {
                tracing::warn!(purpose, error = %e, "Extraction completion failed");
                None
            }
            Err(_) => {
                tracing::warn!(
                    purpose,
                    timeout_ms = self.settings.call_timeout.as_millis() as u64,
                    "Extraction completion timed out"
                );
                None
            }
        }
    }

    /// Candidate place name for `slot`, or `None` when the completion had none.
    pub async fn extract_place(
        &self,
        metadata: RequestMetadata,
        transcript: &[TranscriptEntry],
        slot: PlaceSlot,
        user_input: &str,
    ) -> Option<String> {
        let structured = self.structured();
        let (instruction, schema) = if structured {
            (
                prompts::place_extraction_structured(slot, user_input),
                Some(place_schema()),
            )
        } else {
            (prompts::place_extraction(slot, user_input), None)
        };

        let completion = self.complete(metadata, transcript, instruction, schema).await?;
        let place = if structured {
            extract_place_structured(&completion)
        } else {
            extract_place(&completion)
        };

        if place.is_none() {
            tracing::debug!(slot = %slot.kind(), completion = %completion, "No place in completion");
        }
        place
    }

    /// Date and time read from the user's message, relative to `now`.
    pub async fn extract_date_time(
        &self,
        metadata: RequestMetadata,
        transcript: &[TranscriptEntry],
        user_input: &str,
        now: NaiveDateTime,
    ) -> DateTimeCandidate {
        let structured = self.structured();
        let (instruction, schema) = if structured {
            (
                prompts::date_time_extraction_structured(user_input, now),
                Some(date_time_schema()),
            )
        } else {
            (prompts::date_time_extraction(user_input, now), None)
        };

        match self.complete(metadata, transcript, instruction, schema).await {
            Some(completion) if structured => extract_date_time_structured(&completion),
            Some(completion) => extract_date_time(&completion),
            None => DateTimeCandidate {
                date: FieldValue::Missing,
                time: FieldValue::Missing,
            },
        }
    }
}
