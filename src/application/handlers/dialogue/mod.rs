//! Dialogue handlers.
//!
//! `SubmitMessageHandler` drives a session through
//! destination, origin, date/time and the trip search. The extractor and
//! composer wrap the language model for it.

mod reply_composer;
mod settings;
mod slot_extractor;
mod submit_message;

pub use reply_composer::ReplyComposer;
pub use settings::{DialogueSettings, MAX_CALLS_PER_TURN};
pub use slot_extractor::SlotExtractor;
pub use submit_message::{
    SubmitMessageCommand, SubmitMessageError, SubmitMessageHandler, SubmitMessageResult,
};
