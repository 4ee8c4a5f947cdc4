//! Error types for instadm-instagram

use instadm_core::PlatformError;
use thiserror::Error;

/// instadm-instagram error type
#[derive(Error, Debug)]
pub enum InstagramError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid session settings: {0}")]
    Settings(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<InstagramError> for PlatformError {
    fn from(err: InstagramError) -> Self {
        match err {
            InstagramError::Config(msg) => PlatformError::unknown("ConfigurationError", msg),
            InstagramError::Settings(msg) => PlatformError::unknown("SettingsError", msg),
            InstagramError::Request(e) if e.is_decode() => {
                PlatformError::unknown("ClientJSONDecodeError", e.to_string())
            }
            InstagramError::Request(e) => PlatformError::Connection(e.to_string()),
            InstagramError::Json(e) => {
                PlatformError::unknown("ClientJSONDecodeError", e.to_string())
            }
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, InstagramError>;
