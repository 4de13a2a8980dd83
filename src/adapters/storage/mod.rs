//! Storage adapters for dialogue sessions.
//!
//! - `InMemorySessionStore` - process-local map of per-session locks

mod in_memory_session_store;

pub use in_memory_session_store::InMemorySessionStore;
