//! Trip search handlers.

mod plan_trip;
mod trip_search;

pub use plan_trip::{PlanTripCommand, PlanTripHandler, PlanTripResult};
pub use trip_search::{TripSearch, TripSearchError};
