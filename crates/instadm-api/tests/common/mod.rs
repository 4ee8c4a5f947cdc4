//! Shared test fixtures: a scriptable fake platform and a router built on it.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use instadm_api::{app, AppState};
use instadm_core::{
    AccountInfo, DelayConfig, DmDispatcher, LoggedIn, PlatformClient, PlatformConnector,
    PlatformError, PlatformResult, SessionConfig, SessionCredential, SessionManager,
    SessionState, UserId,
};

#[derive(Default)]
pub struct FakePlatform {
    pub logins: AtomicUsize,
    pub lookups: AtomicUsize,
    pub sends: AtomicUsize,
    pub login_error: Mutex<Option<PlatformError>>,
    pub probe_error: Mutex<Option<PlatformError>>,
    pub lookup_error: Mutex<Option<PlatformError>>,
    pub send_error: Mutex<Option<PlatformError>>,
    pub users: Mutex<HashMap<String, UserId>>,
}

impl FakePlatform {
    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn fail_login(&self, err: Option<PlatformError>) {
        *self.login_error.lock().unwrap() = err;
    }

    pub fn fail_probe(&self, err: Option<PlatformError>) {
        *self.probe_error.lock().unwrap() = err;
    }

    pub fn fail_lookup(&self, err: Option<PlatformError>) {
        *self.lookup_error.lock().unwrap() = err;
    }

    pub fn fail_send(&self, err: Option<PlatformError>) {
        *self.send_error.lock().unwrap() = err;
    }
}

struct FakeClient(Arc<FakePlatform>);

#[async_trait]
impl PlatformClient for FakeClient {
    async fn account_info(&self) -> PlatformResult<AccountInfo> {
        if let Some(err) = self.0.probe_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(AccountInfo {
            pk: 1000,
            username: "sender".to_string(),
            full_name: None,
        })
    }

    async fn user_id_from_username(&self, username: &str) -> PlatformResult<UserId> {
        self.0.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.0.lookup_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.0
            .users
            .lock()
            .unwrap()
            .get(username)
            .copied()
            .ok_or_else(|| PlatformError::UserNotFound(username.to_string()))
    }

    async fn direct_send(&self, _text: &str, _user_ids: &[UserId]) -> PlatformResult<()> {
        self.0.sends.fetch_add(1, Ordering::SeqCst);
        match self.0.send_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn dump_settings(&self) -> PlatformResult<SessionState> {
        Ok(SessionState::new(serde_json::json!({"fake": true})))
    }
}

struct FakeConnector(Arc<FakePlatform>);

#[async_trait]
impl PlatformConnector for FakeConnector {
    fn restore(
        &self,
        _state: &SessionState,
        _proxy: Option<&str>,
    ) -> PlatformResult<Arc<dyn PlatformClient>> {
        Err(PlatformError::unknown("SettingsError", "restore disabled in tests"))
    }

    async fn login(
        &self,
        _credential: &SessionCredential,
        _previous: Option<&SessionState>,
        _proxy: Option<&str>,
    ) -> PlatformResult<LoggedIn> {
        self.0.logins.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.0.login_error.lock().unwrap().clone() {
            return Err(err);
        }
        let client = FakeClient(Arc::clone(&self.0));
        let account = client.account_info().await?;
        Ok(LoggedIn {
            client: Arc::new(client),
            account,
        })
    }
}

/// Router, fake platform and the temp dir holding the session file
pub struct TestApp {
    pub router: Router,
    pub platform: Arc<FakePlatform>,
    pub state: AppState,
    _dir: TempDir,
}

pub fn test_app() -> TestApp {
    test_app_with(Some("1000%3Atoken"), DelayConfig::default())
}

pub fn test_app_with(session_id: Option<&str>, delay: DelayConfig) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(FakePlatform::default());
    platform
        .users
        .lock()
        .unwrap()
        .insert("alice".to_string(), 42);

    let config = SessionConfig {
        session_id: session_id.map(SessionCredential::new),
        state_path: dir.path().join("session.json").display().to_string(),
        proxy: None,
    };
    let sessions = Arc::new(SessionManager::new(
        &config,
        Arc::new(FakeConnector(Arc::clone(&platform))),
    ));
    let state = AppState::new(DmDispatcher::new(sessions, delay));

    TestApp {
        router: app(state.clone()),
        platform,
        state,
        _dir: dir,
    }
}
