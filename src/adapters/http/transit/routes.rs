//! HTTP routes for the transit endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{ask, health, nearest_stops, search_stops, trip, TransitHandlers};

/// Creates the transit router with all endpoints.
pub fn transit_routes(handlers: TransitHandlers) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/nearest_stops", get(nearest_stops))
        .route("/search_stops", get(search_stops))
        .route("/trip", post(trip))
        .route("/health", get(health))
        .with_state(handlers)
}
