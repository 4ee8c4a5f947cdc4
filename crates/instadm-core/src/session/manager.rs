//! Session lifecycle: lazily authenticated, probed before reuse, invalidated
//! on failure.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::platform::{LoggedIn, PlatformConnector, SessionState};
use crate::session::{
    ClientHandle, SessionCredential, SessionError, SessionStateStore, SessionStatus,
};

/// Outcome of the most recent authentication attempt, guarded by the login lock
#[derive(Default)]
struct LoginSlot {
    last_failure: Option<SessionError>,
}

/// Owns the process-wide client handle
///
/// Authentication is serialized by an async mutex. Callers that were already
/// queued behind a failed attempt receive that same failure rather than
/// starting another login.
pub struct SessionManager {
    connector: Arc<dyn PlatformConnector>,
    credential: Option<SessionCredential>,
    proxy: Option<String>,
    store: SessionStateStore,
    handle: RwLock<Option<ClientHandle>>,
    /// Completed authentication attempts; bumped while the login lock is held
    attempts: AtomicU64,
    login: Mutex<LoginSlot>,
}

impl SessionManager {
    /// Create a session manager from resolved session settings
    pub fn new(config: &SessionConfig, connector: Arc<dyn PlatformConnector>) -> Self {
        Self {
            connector,
            credential: config.session_id.clone(),
            proxy: config.proxy.clone(),
            store: SessionStateStore::new(&config.state_path),
            handle: RwLock::new(None),
            attempts: AtomicU64::new(0),
            login: Mutex::new(LoginSlot::default()),
        }
    }

    /// Return a live handle, authenticating if necessary
    pub async fn acquire(&self) -> Result<ClientHandle, SessionError> {
        let seen = self.attempts.load(Ordering::Acquire);

        if let Some(handle) = self.current() {
            if let Some(live) = self.probe(&handle).await {
                return Ok(live);
            }
        }

        let mut slot = self.login.lock().await;

        // A racing caller may have authenticated while we waited
        if let Some(handle) = self.current() {
            if let Some(live) = self.probe(&handle).await {
                return Ok(live);
            }
        }

        if self.attempts.load(Ordering::Acquire) != seen {
            if let Some(err) = &slot.last_failure {
                debug!("Sharing failure of concurrent authentication attempt");
                return Err(err.clone());
            }
        }

        let result = self.authenticate().await;

        match &result {
            Ok(handle) => {
                self.set_current(Some(handle.clone()));
                slot.last_failure = None;
            }
            Err(err) => {
                self.set_current(None);
                slot.last_failure = Some(err.clone());
            }
        }
        self.attempts.fetch_add(1, Ordering::AcqRel);

        result
    }

    /// Drop the cached handle so the next acquire starts cold
    pub fn invalidate(&self) {
        if self.set_current(None).is_some() {
            info!("Session handle invalidated");
        }
    }

    /// Drop the cached handle only if it is still `handle`
    pub fn invalidate_handle(&self, handle: &ClientHandle) {
        let mut guard = self.handle.write().unwrap_or_else(|e| e.into_inner());
        if guard.as_ref().is_some_and(|h| h.same_client(handle)) {
            *guard = None;
            info!("Session handle invalidated");
        }
    }

    /// Cached handle, without probing it
    pub fn current(&self) -> Option<ClientHandle> {
        self.handle
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether a handle is currently cached
    pub fn is_initialized(&self) -> bool {
        self.current().is_some()
    }

    /// Acquire and report the result for operators
    pub async fn status(&self) -> SessionStatus {
        match self.acquire().await {
            Ok(handle) => SessionStatus::Authenticated {
                account: handle.account().clone(),
            },
            Err(SessionError::Configuration(details)) => SessionStatus::NotInitialized { details },
            Err(err) => SessionStatus::AuthenticationFailed {
                details: err.to_string(),
            },
        }
    }

    /// Path of the persisted session state
    pub fn state_store(&self) -> &SessionStateStore {
        &self.store
    }

    fn set_current(&self, handle: Option<ClientHandle>) -> Option<ClientHandle> {
        let mut guard = self.handle.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, handle)
    }

    /// Liveness probe. A failing handle is dropped and `None` returned.
    async fn probe(&self, handle: &ClientHandle) -> Option<ClientHandle> {
        match handle.client().account_info().await {
            Ok(account) => Some(handle.with_account(account)),
            Err(e) => {
                warn!("Cached session failed liveness probe: {}", e);
                self.invalidate_handle(handle);
                None
            }
        }
    }

    async fn authenticate(&self) -> Result<ClientHandle, SessionError> {
        let credential = self.credential.as_ref().ok_or_else(|| {
            SessionError::Configuration(
                "SESSION_ID is not configured. Set it in the environment or .env file.".to_string(),
            )
        })?;

        let proxy = self.proxy.as_deref();
        if let Some(proxy) = proxy {
            info!("Using outbound proxy {}", redact_proxy(proxy));
        }

        let restored = match self.store.load().await {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    "Ignoring unreadable session state at {}: {}",
                    self.store.path().display(),
                    e
                );
                None
            }
        };

        if let Some(state) = &restored {
            if let Some(handle) = self.restore(state, proxy).await {
                return Ok(handle);
            }
        }

        let LoggedIn { client, account } = self
            .connector
            .login(credential, restored.as_ref(), proxy)
            .await
            .map_err(|e| {
                warn!("Authentication failed: {}", e);
                SessionError::Authentication(e)
            })?;

        match client.dump_settings() {
            Ok(state) => {
                if let Err(e) = self.store.save(&state).await {
                    warn!("Failed to persist session state: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize session state: {}", e),
        }

        info!("Authenticated as @{} via session credential", account.username);
        Ok(ClientHandle::new(client, account))
    }

    async fn restore(&self, state: &SessionState, proxy: Option<&str>) -> Option<ClientHandle> {
        let client = match self.connector.restore(state, proxy) {
            Ok(client) => client,
            Err(e) => {
                warn!("Failed to restore session state: {}", e);
                return None;
            }
        };

        match client.account_info().await {
            Ok(account) => {
                info!(
                    "Session restored from {} as @{}",
                    self.store.path().display(),
                    account.username
                );
                Some(ClientHandle::new(client, account))
            }
            Err(e) => {
                debug!("Restored session is not live: {}", e);
                None
            }
        }
    }
}

/// Strip userinfo from a proxy URL before logging it
fn redact_proxy(proxy: &str) -> String {
    match proxy.split_once("://") {
        Some((scheme, rest)) => match rest.rsplit_once('@') {
            Some((_, host)) => format!("{}://***@{}", scheme, host),
            None => proxy.to_string(),
        },
        None => match proxy.rsplit_once('@') {
            Some((_, host)) => format!("***@{}", host),
            None => proxy.to_string(),
        },
    }
}
