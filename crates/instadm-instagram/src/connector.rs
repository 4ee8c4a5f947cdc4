//! Client factory used by the session manager

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use instadm_core::{
    InstagramConfig, LoggedIn, PlatformClient, PlatformConnector, PlatformError, PlatformResult,
    SessionCredential, SessionState,
};

use crate::api::InstagramClient;
use crate::settings::ClientSettings;

/// Builds [`InstagramClient`]s from persisted settings or a session id
#[derive(Debug, Clone)]
pub struct InstagramConnector {
    base_url: String,
    timeout: Duration,
}

impl InstagramConnector {
    pub fn new(config: &InstagramConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl PlatformConnector for InstagramConnector {
    fn restore(
        &self,
        state: &SessionState,
        proxy: Option<&str>,
    ) -> PlatformResult<Arc<dyn PlatformClient>> {
        let settings = ClientSettings::from_state(state)?;
        let client = InstagramClient::new(settings, &self.base_url, proxy, self.timeout)?;
        Ok(Arc::new(client))
    }

    async fn login(
        &self,
        credential: &SessionCredential,
        previous: Option<&SessionState>,
        proxy: Option<&str>,
    ) -> PlatformResult<LoggedIn> {
        // Keep the device fingerprint of the previous session when there is one
        let mut settings = match previous.map(ClientSettings::from_state) {
            Some(Ok(settings)) => settings,
            Some(Err(e)) => {
                debug!("Discarding previous settings: {}", e);
                ClientSettings::new()
            }
            None => ClientSettings::new(),
        };
        settings.cookies.clear();
        settings.set_session_id(credential.expose());

        let client = InstagramClient::new(settings, &self.base_url, proxy, self.timeout)?;

        let account = client.account_info().await.map_err(|e| match e {
            PlatformError::Unknown { message, .. } => PlatformError::LoginRequired(format!(
                "Failed to authenticate with the provided SESSION_ID; it may have expired ({})",
                message
            )),
            other => other,
        })?;

        info!("Logged in as @{} ({})", account.username, account.pk);
        Ok(LoggedIn {
            client: Arc::new(client),
            account,
        })
    }
}
