//! Session error types

use thiserror::Error;

use crate::platform::PlatformError;

/// Failure to produce a live client handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Required settings are missing; retrying will not help
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Authentication(PlatformError),
}

impl SessionError {
    /// Underlying platform error, if any
    pub fn platform_error(&self) -> Option<&PlatformError> {
        match self {
            Self::Configuration(_) => None,
            Self::Authentication(e) => Some(e),
        }
    }
}

impl From<PlatformError> for SessionError {
    fn from(err: PlatformError) -> Self {
        Self::Authentication(err)
    }
}
