//! instadm-gateway: InstaDM server binary
//!
//! Usage:
//!   instadm-gateway           - Start the HTTP API
//!   instadm-gateway --help    - Show help

use instadm_api::AppState;
use instadm_core::{ApiConfig, Config, DmDispatcher, SessionManager};
use instadm_instagram::InstagramConnector;
use std::future::Future;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Serve HTTP until Ctrl+C
    Server,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("instadm-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    // Before tracing init: .env may set RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting instadm-gateway...");
    tracing::info!(
        "Delay range {}-{}s ({:?})",
        config.delay.min,
        config.delay.max,
        config.delay.mode
    );

    run_server(config).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("instadm-gateway - Instagram direct message HTTP gateway");
    println!();
    println!("Usage:");
    println!("  instadm-gateway           Start the HTTP API");
    println!("  instadm-gateway --help    Show this help message");
    println!("  instadm-gateway --version Show version");
    println!();
    println!("Settings are read from ./instadm.toml when present, then from the environment.");
    println!();
    println!("Environment Variables:");
    println!("  SESSION_ID           Instagram session cookie (required to send)");
    println!("  PROXY                Proxy URL for Instagram traffic (optional)");
    println!("  SESSION_FILE         Session state file (default: session.json)");
    println!("  API_HOST             Listen host (default: 0.0.0.0)");
    println!("  API_PORT             Listen port (default: 5001)");
    println!("  DM_DELAY_MIN         Default minimum pacing delay in seconds (default: 5)");
    println!("  DM_DELAY_MAX         Default maximum pacing delay in seconds (default: 15)");
    println!("  DM_DELAY_LIMIT       Largest delay_max a request may ask for (default: 300)");
    println!("  DM_DELAY_MODE        advisory or blocking (default: advisory)");
    println!("  INSTAGRAM_BASE_URL   Private API endpoint (default: https://i.instagram.com)");
    println!("  RUST_LOG             Log filter (default: info)");
}

/// Serve the HTTP API until Ctrl+C
async fn run_server(config: Config) -> anyhow::Result<()> {
    let connector = Arc::new(InstagramConnector::new(&config.instagram));
    let sessions = Arc::new(SessionManager::new(&config.session, connector));

    // Warm the session so the first request does not pay for login
    match sessions.acquire().await {
        Ok(handle) => tracing::info!("Session ready for @{}", handle.account().username),
        Err(e) => tracing::warn!("Initial session setup failed, will retry on demand: {}", e),
    }

    let dispatcher = DmDispatcher::new(Arc::clone(&sessions), config.delay.clone());
    let state = AppState::new(dispatcher);

    tracing::info!("Press Ctrl+C to exit");
    serve_until(config.api.clone(), state, tokio::signal::ctrl_c()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Run the HTTP API until `shutdown` resolves. A server that stops on its
/// own (bind failure, listener error) is reported as an error.
async fn serve_until<F>(api_config: ApiConfig, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let addr = format!("{}:{}", api_config.host, api_config.port);
    let mut server =
        tokio::spawn(async move { instadm_api::start_server(&api_config, state).await });
    tracing::info!("HTTP API server starting on {}", addr);

    tokio::select! {
        result = &mut server => {
            let err = match result {
                Ok(Ok(())) => anyhow::anyhow!("HTTP API server stopped unexpectedly"),
                Ok(Err(e)) => anyhow::anyhow!("HTTP API error on {}: {}", addr, e),
                Err(e) => anyhow::anyhow!("HTTP API task failed: {}", e),
            };
            tracing::error!("{}", err);
            Err(err)
        }
        signal = shutdown => {
            server.abort();
            signal?;
            tracing::info!("Shutting down...");
            Ok(())
        }
    }
}
