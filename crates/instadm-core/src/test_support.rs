//! In-process fake platform for unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::platform::{
    AccountInfo, LoggedIn, PlatformClient, PlatformConnector, PlatformError, PlatformResult,
    SessionState, UserId,
};
use crate::session::SessionCredential;

/// Behaviour knobs and call counters shared by the connector and its clients
#[derive(Default)]
pub struct FakePlatform {
    pub logins: AtomicUsize,
    pub restores: AtomicUsize,
    pub probes: AtomicUsize,
    pub lookups: AtomicUsize,
    pub sends: AtomicUsize,
    pub login_error: Mutex<Option<PlatformError>>,
    pub probe_error: Mutex<Option<PlatformError>>,
    pub lookup_error: Mutex<Option<PlatformError>>,
    pub send_error: Mutex<Option<PlatformError>>,
    pub users: Mutex<HashMap<String, UserId>>,
    pub sent: Mutex<Vec<(String, Vec<UserId>)>>,
    pub login_delay: Mutex<Duration>,
}

impl FakePlatform {
    pub fn new() -> Arc<Self> {
        let platform = Self::default();
        platform
            .users
            .lock()
            .unwrap()
            .insert("alice".to_string(), 42);
        Arc::new(platform)
    }

    pub fn set_login_error(&self, err: Option<PlatformError>) {
        *self.login_error.lock().unwrap() = err;
    }

    pub fn set_probe_error(&self, err: Option<PlatformError>) {
        *self.probe_error.lock().unwrap() = err;
    }

    pub fn set_lookup_error(&self, err: Option<PlatformError>) {
        *self.lookup_error.lock().unwrap() = err;
    }

    pub fn set_send_error(&self, err: Option<PlatformError>) {
        *self.send_error.lock().unwrap() = err;
    }

    pub fn set_login_delay(&self, delay: Duration) {
        *self.login_delay.lock().unwrap() = delay;
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    fn account() -> AccountInfo {
        AccountInfo {
            pk: 1000,
            username: "sender".to_string(),
            full_name: Some("Sender Account".to_string()),
        }
    }
}

pub struct FakeClient {
    platform: Arc<FakePlatform>,
    session_id: String,
}

#[async_trait]
impl PlatformClient for FakeClient {
    async fn account_info(&self) -> PlatformResult<AccountInfo> {
        self.platform.probes.fetch_add(1, Ordering::SeqCst);
        match self.platform.probe_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(FakePlatform::account()),
        }
    }

    async fn user_id_from_username(&self, username: &str) -> PlatformResult<UserId> {
        self.platform.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.platform.lookup_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.platform
            .users
            .lock()
            .unwrap()
            .get(username)
            .copied()
            .ok_or_else(|| PlatformError::UserNotFound(username.to_string()))
    }

    async fn direct_send(&self, text: &str, user_ids: &[UserId]) -> PlatformResult<()> {
        self.platform.sends.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.platform.send_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.platform
            .sent
            .lock()
            .unwrap()
            .push((text.to_string(), user_ids.to_vec()));
        Ok(())
    }

    fn dump_settings(&self) -> PlatformResult<SessionState> {
        Ok(SessionState::new(
            serde_json::json!({ "sessionid": self.session_id }),
        ))
    }
}

pub struct FakeConnector {
    pub platform: Arc<FakePlatform>,
}

impl FakeConnector {
    pub fn new(platform: Arc<FakePlatform>) -> Arc<Self> {
        Arc::new(Self { platform })
    }
}

#[async_trait]
impl PlatformConnector for FakeConnector {
    fn restore(
        &self,
        state: &SessionState,
        _proxy: Option<&str>,
    ) -> PlatformResult<Arc<dyn PlatformClient>> {
        self.platform.restores.fetch_add(1, Ordering::SeqCst);
        let session_id = state.as_value()["sessionid"]
            .as_str()
            .ok_or_else(|| PlatformError::unknown("SettingsError", "missing sessionid"))?
            .to_string();
        Ok(Arc::new(FakeClient {
            platform: Arc::clone(&self.platform),
            session_id,
        }))
    }

    async fn login(
        &self,
        credential: &SessionCredential,
        _previous: Option<&SessionState>,
        _proxy: Option<&str>,
    ) -> PlatformResult<LoggedIn> {
        self.platform.logins.fetch_add(1, Ordering::SeqCst);
        let delay = *self.platform.login_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.platform.login_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(LoggedIn {
            client: Arc::new(FakeClient {
                platform: Arc::clone(&self.platform),
                session_id: credential.expose().to_string(),
            }),
            account: FakePlatform::account(),
        })
    }
}
