//! HTTP adapters - REST API implementations.

mod router;
pub mod transit;

pub use router::build_router;
pub use transit::{transit_routes, TransitHandlers};
