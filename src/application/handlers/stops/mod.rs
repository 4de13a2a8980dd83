//! Stop lookup handlers and the two-tier resolver shared with the dialogue.

mod resolve_nearest;
mod search_stops;
mod stop_resolver;

pub use resolve_nearest::{ResolveNearestHandler, ResolveNearestQuery};
pub use search_stops::{SearchStopsHandler, SearchStopsQuery, DEFAULT_SEARCH_LIMIT, MIN_FRAGMENT_LEN};
pub use stop_resolver::StopResolver;
