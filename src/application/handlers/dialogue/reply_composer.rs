//! Natural-language replies for turn outcomes.

use std::sync::Arc;

use super::DialogueSettings;
use crate::domain::dialogue::{prompts, Slots, TranscriptEntry, TurnOutcome};
use crate::ports::{AIProvider, CompletionRequest, RequestMetadata};

pub struct ReplyComposer {
    ai: Arc<dyn AIProvider>,
    settings: Arc<DialogueSettings>,
}

impl ReplyComposer {
    pub fn new(ai: Arc<dyn AIProvider>, settings: Arc<DialogueSettings>) -> Self {
        Self { ai, settings }
    }

    fn max_tokens(&self, outcome: &TurnOutcome) -> u32 {
        match outcome {
            TurnOutcome::TripFound { .. } => self.settings.trip_reply_max_tokens,
            _ => self.settings.reply_max_tokens,
        }
    }

    /// Reply to `outcome`. Falls back to a fixed text when the model fails.
    pub async fn compose(
        &self,
        metadata: RequestMetadata,
        transcript: &[TranscriptEntry],
        outcome: &TurnOutcome,
        slots: &Slots,
    ) -> String {
        let keyword = self.settings.primary_keyword();
        let instruction = format!(
            "{}{}",
            prompts::reply_instruction(outcome, slots, keyword),
            prompts::language_directive(&self.settings.reply_language)
        );

        let request = CompletionRequest::new(metadata)
            .with_transcript(transcript)
            .with_instruction(instruction)
            .with_max_tokens(self.max_tokens(outcome))
            .with_temperature(self.settings.temperature);

        let failure = match tokio::time::timeout(self.settings.call_timeout, self.ai.complete(request))
            .await
        {
            Ok(Ok(response)) if !response.content.trim().is_empty() => return response.content,
            Ok(Ok(_)) => "empty completion".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => "timed out".to_string(),
        };

        tracing::warn!(
            outcome = outcome.name(),
            error = %failure,
            "Reply completion failed, using fallback text"
        );
        prompts::fallback_reply(outcome, slots, keyword)
    }
}
