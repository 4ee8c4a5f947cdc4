//! DM dispatch: session → lookup → send, folded into a closed outcome set

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::{DelayConfig, DelayMode};
use crate::dm::DmRequest;
use crate::platform::PlatformError;
use crate::session::{ClientHandle, SessionError, SessionManager};

/// Successful send
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DmReceipt {
    pub username: String,
    pub message: String,
    /// Pacing delay in seconds (applied or recommended, depending on mode)
    pub delay: u64,
}

/// Every way a DM request can end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmOutcome {
    Sent(DmReceipt),
    /// Rejected before any platform call
    InvalidRequest(String),
    /// Credential expired, challenge or two-factor required
    AuthFailed(PlatformError),
    RateLimited(PlatformError),
    FeedbackBlocked(PlatformError),
    NotFound { username: String, cause: PlatformError },
    ConnectionFailed(String),
    Unknown { category: String, detail: String },
}

impl DmOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Sent(_))
    }

    /// Map a platform error raised on the send path
    fn from_platform(err: PlatformError) -> Self {
        match err {
            e @ (PlatformError::LoginRequired(_)
            | PlatformError::ChallengeRequired(_)
            | PlatformError::TwoFactorRequired(_)) => Self::AuthFailed(e),
            e @ PlatformError::RateLimited(_) => Self::RateLimited(e),
            e @ PlatformError::FeedbackRequired(_) => Self::FeedbackBlocked(e),
            PlatformError::UserNotFound(username) => Self::NotFound {
                cause: PlatformError::UserNotFound(username.clone()),
                username,
            },
            PlatformError::Connection(detail) => Self::ConnectionFailed(detail),
            PlatformError::Unknown { category, message } => Self::Unknown {
                category,
                detail: message,
            },
        }
    }

    /// Map a failure to obtain a session
    fn from_session(err: SessionError) -> Self {
        match err {
            SessionError::Configuration(detail) => Self::Unknown {
                category: "ConfigurationError".to_string(),
                detail,
            },
            SessionError::Authentication(cause) => match cause {
                PlatformError::Connection(detail) => {
                    Self::ConnectionFailed(format!("Authentication failed: {}", detail))
                }
                PlatformError::Unknown { category, message } => Self::Unknown {
                    category,
                    detail: format!("Authentication failed: {}", message),
                },
                e @ PlatformError::RateLimited(_) => Self::RateLimited(e),
                e @ PlatformError::FeedbackRequired(_) => Self::FeedbackBlocked(e),
                other => Self::AuthFailed(other),
            },
        }
    }
}

/// Sends direct messages through the shared session
pub struct DmDispatcher {
    sessions: Arc<SessionManager>,
    delay: DelayConfig,
}

impl DmDispatcher {
    pub fn new(sessions: Arc<SessionManager>, delay: DelayConfig) -> Self {
        Self { sessions, delay }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Run one DM request to completion. Nothing is retried.
    pub async fn dispatch(&self, request: DmRequest) -> DmOutcome {
        let dm = match request.validate(&self.delay) {
            Ok(dm) => dm,
            Err(e) => return DmOutcome::InvalidRequest(e.to_string()),
        };

        let handle = match self.sessions.acquire().await {
            Ok(handle) => handle,
            Err(e) => {
                error!("Could not obtain session: {}", e);
                return DmOutcome::from_session(e);
            }
        };

        // Lookups are rate-limited by the platform; a failure is reported, never retried
        let user_id = match handle.client().user_id_from_username(&dm.username).await {
            Ok(id) => id,
            Err(e) if e.is_auth_failure()
                || matches!(
                    e,
                    PlatformError::RateLimited(_) | PlatformError::FeedbackRequired(_)
                ) =>
            {
                return self.platform_failure(&handle, e);
            }
            Err(e) => {
                warn!("Lookup for @{} failed: {}", dm.username, e);
                return DmOutcome::NotFound {
                    username: dm.username,
                    cause: e,
                };
            }
        };

        if let Err(e) = handle.client().direct_send(&dm.message, &[user_id]).await {
            return self.platform_failure(&handle, e);
        }

        let delay = dm.delay.sample();
        match self.delay.mode {
            DelayMode::Advisory => {
                info!("DM sent to @{}; recommended pause {}s", dm.username, delay);
            }
            DelayMode::Blocking => {
                info!("DM sent to @{}; pausing {}s before responding", dm.username, delay);
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
        }

        DmOutcome::Sent(DmReceipt {
            username: dm.username,
            message: dm.message,
            delay,
        })
    }

    fn platform_failure(&self, handle: &ClientHandle, err: PlatformError) -> DmOutcome {
        if err.is_auth_failure() {
            error!("Session rejected by platform: {}", err);
            self.sessions.invalidate_handle(handle);
        } else {
            error!("Platform error ({}): {}", err.category(), err);
        }
        DmOutcome::from_platform(err)
    }
}
