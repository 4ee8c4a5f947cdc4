//! Session types

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

use crate::platform::{AccountInfo, PlatformClient};

/// Session credential (`sessionid` cookie value), zeroized on drop
#[derive(Clone)]
pub struct SessionCredential(Zeroizing<String>);

impl SessionCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Raw credential value. Do not log.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential(***)")
    }
}

impl<'de> Deserialize<'de> for SessionCredential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// A live, authenticated client shared by all requests
#[derive(Clone)]
pub struct ClientHandle {
    client: Arc<dyn PlatformClient>,
    account: AccountInfo,
}

impl ClientHandle {
    pub fn new(client: Arc<dyn PlatformClient>, account: AccountInfo) -> Self {
        Self { client, account }
    }

    pub fn client(&self) -> &dyn PlatformClient {
        self.client.as_ref()
    }

    /// Account identity as of the last successful probe
    pub fn account(&self) -> &AccountInfo {
        &self.account
    }

    /// Whether both handles wrap the same client instance
    pub fn same_client(&self, other: &ClientHandle) -> bool {
        Arc::ptr_eq(&self.client, &other.client)
    }

    pub(crate) fn with_account(&self, account: AccountInfo) -> Self {
        Self {
            client: Arc::clone(&self.client),
            account,
        }
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

/// Operator-facing session status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "client_status")]
pub enum SessionStatus {
    #[serde(rename = "Not Initialized")]
    NotInitialized { details: String },

    #[serde(rename = "Authentication Failed")]
    AuthenticationFailed { details: String },

    #[serde(rename = "Authenticated")]
    Authenticated { account: AccountInfo },
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotInitialized { .. } => "Not Initialized",
            Self::AuthenticationFailed { .. } => "Authentication Failed",
            Self::Authenticated { .. } => "Authenticated",
        }
    }
}
