//! HTTP API Server
//!
//! Starts and manages the axum-based HTTP server.

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use instadm_core::{ApiConfig, DmDispatcher, SessionManager};

use crate::error::{ApiError, Result};
use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<DmDispatcher>,
}

impl AppState {
    pub fn new(dispatcher: DmDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        self.dispatcher.sessions()
    }
}

/// Build the application router with middleware
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Resolve the listen address from API settings
pub fn bind_addr(config: &ApiConfig) -> Result<SocketAddr> {
    format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ApiError::InvalidAddress(format!("{}:{} ({})", config.host, config.port, e)))
}

/// Start the HTTP API server
pub async fn start_server(config: &ApiConfig, state: AppState) -> Result<()> {
    let addr = bind_addr(config)?;
    let app = app(state);

    info!("HTTP API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr() {
        let addr = bind_addr(&ApiConfig::default()).unwrap();
        assert_eq!(addr.port(), 5001);
        assert!(addr.ip().is_unspecified());

        let config = ApiConfig {
            host: "not a host".to_string(),
            port: 80,
        };
        assert!(matches!(bind_addr(&config), Err(ApiError::InvalidAddress(_))));
    }
}
