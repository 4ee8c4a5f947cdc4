//! Platform error taxonomy
//!
//! Every failure raised by a platform client is folded into this closed set,
//! so callers can match on it exhaustively instead of inspecting messages.

use thiserror::Error;

/// Errors reported by a [`PlatformClient`](super::PlatformClient) or
/// [`PlatformConnector`](super::PlatformConnector)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Login required: {0}")]
    LoginRequired(String),

    #[error("Challenge required: {0}")]
    ChallengeRequired(String),

    #[error("Two-factor authentication required: {0}")]
    TwoFactorRequired(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Feedback required: {0}")]
    FeedbackRequired(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("{category}: {message}")]
    Unknown { category: String, message: String },
}

impl PlatformError {
    /// Build an [`PlatformError::Unknown`] from a category and message
    pub fn unknown(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unknown {
            category: category.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the session is no longer usable
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::LoginRequired(_) | Self::ChallengeRequired(_) | Self::TwoFactorRequired(_)
        )
    }

    /// Short machine-readable category name
    pub fn category(&self) -> &str {
        match self {
            Self::LoginRequired(_) => "LoginRequired",
            Self::ChallengeRequired(_) => "ChallengeRequired",
            Self::TwoFactorRequired(_) => "TwoFactorRequired",
            Self::RateLimited(_) => "RateLimitError",
            Self::FeedbackRequired(_) => "FeedbackRequired",
            Self::UserNotFound(_) => "UserNotFound",
            Self::Connection(_) => "ConnectionError",
            Self::Unknown { category, .. } => category,
        }
    }

    /// Underlying message without the category prefix
    pub fn detail(&self) -> &str {
        match self {
            Self::LoginRequired(m)
            | Self::ChallengeRequired(m)
            | Self::TwoFactorRequired(m)
            | Self::RateLimited(m)
            | Self::FeedbackRequired(m)
            | Self::UserNotFound(m)
            | Self::Connection(m) => m,
            Self::Unknown { message, .. } => message,
        }
    }
}

/// Result type alias for platform calls
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;
