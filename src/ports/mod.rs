//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Language model completions
//! - `Geocoder` - Address to coordinates
//! - `StopDirectory` - Canonical stop lookup
//! - `TripPlanner` - Itinerary requests
//! - `SessionStore` - Live dialogue sessions

mod ai_provider;
mod geocoder;
mod session_store;
mod stop_directory;
mod trip_planner;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, ResponseSchema, TokenUsage,
};
pub use geocoder::{GeocodeError, Geocoder};
pub use session_store::{SessionHandle, SessionStore, SessionStoreError};
pub use stop_directory::{StopDirectory, StopDirectoryError};
pub use trip_planner::{TripPlan, TripPlanner, TripRequest, TripServiceError};
