//! HTTP DTOs for the transit endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{PlanTripCommand, SubmitMessageResult};
use crate::domain::foundation::{DomainError, ErrorCode};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// One user message in a conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub query: String,
    pub session_id: String,
}

/// Free-text query parameter shared by the stop lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct StopQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Direct trip search between two named stops.
#[derive(Debug, Clone, Deserialize)]
pub struct TripRequest {
    pub origin_name: String,
    pub destination_name: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
}

impl From<TripRequest> for PlanTripCommand {
    fn from(req: TripRequest) -> Self {
        Self {
            origin_name: req.origin_name,
            destination_name: req.destination_name,
            date: req.date,
            time: req.time,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub reply_text: String,
    pub session_id: String,
    /// Dialogue state after the turn
    pub state: String,
}

impl From<SubmitMessageResult> for AskResponse {
    fn from(result: SubmitMessageResult) -> Self {
        Self {
            reply_text: result.reply_text,
            session_id: result.session_key.to_string(),
            state: result.state.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NearestStopResponse {
    pub stop_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
            details: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            code: "CONFLICT".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            code: "SERVICE_UNAVAILABLE".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(error: &DomainError) -> Self {
        let details = (!error.details.is_empty()).then(|| {
            serde_json::Value::Object(
                error
                    .details
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            )
        });
        let message = match error.code {
            // Infrastructure messages may carry connection details.
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                "Internal server error".to_string()
            }
            _ => error.message.clone(),
        };
        Self {
            code: error.code.to_string(),
            message,
            details,
        }
    }
}
