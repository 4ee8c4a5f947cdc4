//! Persisted client settings (cookies and device fingerprint)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use instadm_core::SessionState;

use crate::error::{InstagramError, Result};

/// Default mobile user agent
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Instagram 269.0.0.18.75 Android ",
    "(26/8.0.0; 480dpi; 1080x1920; OnePlus; 6T Dev; devitron; qcom; en_US; 314665256)"
);

const SESSIONID_COOKIE: &str = "sessionid";
const DS_USER_ID_COOKIE: &str = "ds_user_id";
const CSRFTOKEN_COOKIE: &str = "csrftoken";

/// Device identifiers kept stable across logins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    pub device_id: String,
    pub uuid: String,
    pub phone_id: String,
    pub user_agent: String,
}

impl DeviceSettings {
    /// Generate a fresh device fingerprint
    pub fn generate() -> Self {
        let seed = Uuid::new_v4().simple().to_string();
        Self {
            device_id: format!("android-{}", &seed[..16]),
            uuid: Uuid::new_v4().to_string(),
            phone_id: Uuid::new_v4().to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Everything needed to rebuild an authenticated client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub device: DeviceSettings,
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl ClientSettings {
    /// Fresh settings with a new device and no cookies
    pub fn new() -> Self {
        Self {
            device: DeviceSettings::generate(),
            cookies: BTreeMap::new(),
            last_login: None,
        }
    }

    /// Install a session id, deriving `ds_user_id` from its prefix
    pub fn set_session_id(&mut self, session_id: &str) {
        self.cookies
            .insert(SESSIONID_COOKIE.to_string(), session_id.to_string());

        if let Some(user_id) = user_id_from_session_id(session_id) {
            self.cookies
                .insert(DS_USER_ID_COOKIE.to_string(), user_id.to_string());
        }
        self.last_login = Some(Utc::now());
    }

    pub fn session_id(&self) -> Option<&str> {
        self.cookies.get(SESSIONID_COOKIE).map(String::as_str)
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.cookies.get(CSRFTOKEN_COOKIE).map(String::as_str)
    }

    /// `Cookie` header value
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn to_state(&self) -> Result<SessionState> {
        Ok(SessionState::new(serde_json::to_value(self)?))
    }

    pub fn from_state(state: &SessionState) -> Result<Self> {
        let settings: Self = serde_json::from_value(state.as_value().clone())?;
        if settings.session_id().is_none() {
            return Err(InstagramError::Settings(
                "persisted settings carry no sessionid cookie".to_string(),
            ));
        }
        Ok(settings)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Session ids look like `<user id>%3A<token>%3A...`
fn user_id_from_session_id(session_id: &str) -> Option<&str> {
    let prefix = session_id
        .split("%3A")
        .next()
        .and_then(|p| p.split(':').next())?;
    (!prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit())).then_some(prefix)
}
