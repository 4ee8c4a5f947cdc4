//! HTTP API handlers
//!
//! DM sending and session status endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, warn};

use instadm_core::{DmOutcome, DmRequest, SessionStatus};

use crate::server::AppState;

// ============================================================================
// Response types
// ============================================================================

/// Successful DM response payload
#[derive(Debug, Serialize)]
pub struct SendDmResponse {
    pub success: bool,
    pub username: String,
    pub message: String,
    /// Pacing delay in seconds
    pub delay: u64,
}

/// Generic API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
            category: None,
        }
    }

    fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Session status payload for `/test`
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub session: SessionStatus,
}

// ============================================================================
// Handler functions
// ============================================================================

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Send a direct message
pub async fn send_dm(
    State(state): State<AppState>,
    payload: Result<Json<DmRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected DM request: {}", rejection.body_text());
            return error(
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Invalid JSON request.").details(rejection.body_text()),
            );
        }
    };

    debug!("DM request for {:?}", request.username);
    outcome_response(state.dispatcher.dispatch(request).await)
}

/// Session status for operators. Always 200.
pub async fn test_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let session = state.sessions().status().await;
    Json(StatusResponse {
        status: "InstaDM Server Online",
        session,
    })
}

/// Map a DM outcome to its HTTP status and body
pub fn outcome_response(outcome: DmOutcome) -> Response {
    match outcome {
        DmOutcome::Sent(receipt) => (
            StatusCode::OK,
            Json(SendDmResponse {
                success: true,
                username: receipt.username,
                message: receipt.message,
                delay: receipt.delay,
            }),
        )
            .into_response(),
        DmOutcome::InvalidRequest(reason) => {
            error(StatusCode::BAD_REQUEST, ErrorResponse::new(reason))
        }
        DmOutcome::AuthFailed(cause) => error(
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new(
                "Session expired or security verification required. Update SESSION_ID.",
            )
            .details(cause.to_string())
            .category(cause.category()),
        ),
        DmOutcome::RateLimited(cause) => error(
            StatusCode::TOO_MANY_REQUESTS,
            ErrorResponse::new(
                "Rate limit reached. Please wait a few hours before trying again.",
            )
            .details(cause.to_string())
            .category(cause.category()),
        ),
        DmOutcome::FeedbackBlocked(cause) => error(
            StatusCode::FORBIDDEN,
            ErrorResponse::new(
                "Spam feedback received. Instagram has temporarily blocked sending messages.",
            )
            .details(cause.to_string())
            .category(cause.category()),
        ),
        DmOutcome::NotFound { username, cause } => error(
            StatusCode::NOT_FOUND,
            ErrorResponse::new(format!("User @{} not found or lookup failed.", username))
                .details(cause.to_string()),
        ),
        DmOutcome::ConnectionFailed(detail) => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(detail).category("ConnectionError"),
        ),
        DmOutcome::Unknown { category, detail } => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new(format!("Internal server error: {}", category))
                .details(detail)
                .category(category),
        ),
    }
}

fn error(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}
