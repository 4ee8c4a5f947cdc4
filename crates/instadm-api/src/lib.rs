//! instadm-api: HTTP API for InstaDM Gateway
//!
//! Exposes DM sending and session status over HTTP.
//! Built with axum for async HTTP handling.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{app, start_server, AppState};
