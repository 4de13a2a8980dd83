//! Open Journey Planner (OJP 1.0) adapter.
//!
//! - `request` - builds the `OJPTripRequest` XML document
//! - `response` - extracts itineraries from an `OJPTripDelivery`
//! - `OjpTripPlanner` - posts the request over HTTP
//! - `MockTripPlanner` - scripted results for tests

mod mock_trip_planner;
mod ojp_trip_planner;
pub mod request;
pub mod response;

pub use mock_trip_planner::MockTripPlanner;
pub use ojp_trip_planner::{OjpConfig, OjpTripPlanner};
