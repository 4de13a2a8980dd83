//! Transit domain - stops, trip queries and itineraries.

mod itinerary;
mod resolution;
mod stop;
mod trip;

pub use itinerary::{describe_all, format_service_time, Itinerary, Leg, UNKNOWN};
pub use resolution::{ResolutionMethod, ResolvedStop};
pub use stop::{Coordinates, Stop, StopId};
pub use trip::{TripQuery, DEPARTURE_TIMESTAMP_FORMAT};
