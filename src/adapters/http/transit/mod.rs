//! HTTP adapter for the conversation, stop lookup and trip endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AskRequest, AskResponse, ErrorResponse, HealthResponse, NearestStopResponse, StopQuery,
    TripRequest,
};
pub use handlers::TransitHandlers;
pub use routes::transit_routes;
