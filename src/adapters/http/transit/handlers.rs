//! HTTP handlers for the transit endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::{
    PlanTripHandler, ResolveNearestHandler, ResolveNearestQuery, SearchStopsHandler,
    SearchStopsQuery, SubmitMessageCommand, SubmitMessageError, SubmitMessageHandler,
};
use crate::domain::foundation::{DomainError, ErrorCode, SessionKey};

use super::dto::{
    AskRequest, AskResponse, ErrorResponse, HealthResponse, NearestStopResponse, StopQuery,
    TripRequest,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct TransitHandlers {
    submit_message: Arc<SubmitMessageHandler>,
    resolve_nearest: Arc<ResolveNearestHandler>,
    search_stops: Arc<SearchStopsHandler>,
    plan_trip: Arc<PlanTripHandler>,
}

impl TransitHandlers {
    pub fn new(
        submit_message: Arc<SubmitMessageHandler>,
        resolve_nearest: Arc<ResolveNearestHandler>,
        search_stops: Arc<SearchStopsHandler>,
        plan_trip: Arc<PlanTripHandler>,
    ) -> Self {
        Self {
            submit_message,
            resolve_nearest,
            search_stops,
            plan_trip,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /ask - Submit one message to a conversation
pub async fn ask(State(handlers): State<TransitHandlers>, Json(req): Json<AskRequest>) -> Response {
    let session_key = match SessionKey::new(req.session_id) {
        Ok(key) => key,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(e.to_string())),
            )
                .into_response()
        }
    };

    let cmd = SubmitMessageCommand::new(session_key, req.query);
    match handlers.submit_message.handle(cmd).await {
        Ok(result) => (StatusCode::OK, Json(AskResponse::from(result))).into_response(),
        Err(e) => handle_submit_error(e),
    }
}

/// GET /nearest_stops?query= - Stop closest to a geocoded place
pub async fn nearest_stops(
    State(handlers): State<TransitHandlers>,
    Query(params): Query<StopQuery>,
) -> Response {
    let Some(text) = params.query else {
        return missing_query();
    };

    match handlers
        .resolve_nearest
        .handle(ResolveNearestQuery { text: text.clone() })
        .await
    {
        Ok(Some(stop_name)) => {
            (StatusCode::OK, Json(NearestStopResponse { stop_name })).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Stop near", &text)),
        )
            .into_response(),
        Err(e) => handle_domain_error(e),
    }
}

/// GET /search_stops?query= - Unique stop names containing a fragment
pub async fn search_stops(
    State(handlers): State<TransitHandlers>,
    Query(params): Query<StopQuery>,
) -> Response {
    let Some(fragment) = params.query else {
        return missing_query();
    };

    let query = SearchStopsQuery {
        fragment,
        limit: params.limit,
    };
    match handlers.search_stops.handle(query).await {
        Ok(names) => (StatusCode::OK, Json(names)).into_response(),
        Err(e) => handle_domain_error(e),
    }
}

/// POST /trip - Itineraries between two named stops
pub async fn trip(State(handlers): State<TransitHandlers>, Json(req): Json<TripRequest>) -> Response {
    match handlers.plan_trip.handle(req.into()).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => handle_domain_error(e),
    }
}

/// GET /health - Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn missing_query() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request("Query parameter 'query' is required")),
    )
        .into_response()
}

fn handle_submit_error(error: SubmitMessageError) -> Response {
    match error {
        SubmitMessageError::EmptyText => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Message text cannot be empty")),
        )
            .into_response(),
        SubmitMessageError::SessionRemoved(key) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::conflict(format!(
                "Session {} ended while the message was processed",
                key
            ))),
        )
            .into_response(),
        SubmitMessageError::SessionUnavailable(key) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::unavailable(format!(
                "Session {} is busy, retry shortly",
                key
            ))),
        )
            .into_response(),
        SubmitMessageError::Store(e) => {
            tracing::error!(error = %e, "Session store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Internal server error")),
            )
                .into_response()
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::SessionNotFound | ErrorCode::StopNotFound => StatusCode::NOT_FOUND,
        ErrorCode::GeocodeUnavailable
        | ErrorCode::TripServiceFailure
        | ErrorCode::AIProviderError => StatusCode::BAD_GATEWAY,
        ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn handle_domain_error(error: DomainError) -> Response {
    let status = status_for(error.code);
    if status.is_server_error() {
        tracing::error!(code = %error.code, error = %error.message, "Request failed");
    }
    (status, Json(ErrorResponse::from(&error))).into_response()
}
