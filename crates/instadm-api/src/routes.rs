//! Route definitions
//!
//! Defines all HTTP API endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health, send_dm, test_status};
use crate::server::AppState;

/// Create the API router
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Session status
        .route("/test", get(test_status))
        // DM endpoint
        .route("/send_dm", post(send_dm))
}
