//! Platform client abstraction
//!
//! The session manager and DM dispatcher only talk to the social platform
//! through these traits. A concrete client lives in `instadm-instagram`.

mod error;

pub use error::{PlatformError, PlatformResult};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::session::SessionCredential;

/// Platform-internal numeric user identifier
pub type UserId = u64;

/// Identity of the authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub pk: UserId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Serialized client settings (cookies, device fingerprint, tokens)
///
/// Opaque to everything except the connector that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(serde_json::Value);

impl SessionState {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// An authenticated platform client
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Fetch the logged-in account. Used as the liveness probe.
    async fn account_info(&self) -> PlatformResult<AccountInfo>;

    /// Resolve a username to its numeric id
    async fn user_id_from_username(&self, username: &str) -> PlatformResult<UserId>;

    /// Send a direct text message to the given users
    async fn direct_send(&self, text: &str, user_ids: &[UserId]) -> PlatformResult<()>;

    /// Serialize the client settings for persistence
    fn dump_settings(&self) -> PlatformResult<SessionState>;
}

/// Factory for platform clients
#[async_trait]
pub trait PlatformConnector: Send + Sync {
    /// Build a client from previously persisted settings. No network call.
    fn restore(
        &self,
        state: &SessionState,
        proxy: Option<&str>,
    ) -> PlatformResult<Arc<dyn PlatformClient>>;

    /// Authenticate with the session credential and confirm the login.
    ///
    /// `previous` carries restored settings whose device fingerprint should
    /// be kept across logins.
    async fn login(
        &self,
        credential: &SessionCredential,
        previous: Option<&SessionState>,
        proxy: Option<&str>,
    ) -> PlatformResult<LoggedIn>;
}

/// A freshly authenticated client and the account it belongs to
pub struct LoggedIn {
    pub client: Arc<dyn PlatformClient>,
    pub account: AccountInfo,
}
