//! # hookd-server
//!
//! Management-plane HTTP API for webhook subscriptions.
//!
//! This binary provides:
//! - **Subscriber registration** and lookup
//! - **Delivery endpoint management** under a subscriber, with per-endpoint
//!   event-type filters and a signing secret issued at creation
//! - **Message recording** for later delivery
//!
//! Outbound delivery (signing, retries, backoff) is a separate concern and
//! lives outside this service.

mod api;
mod config;
mod endpoints;
mod error;
mod messages;
mod subscribers;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hookd_store::Database;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load a local .env file when present, then initialize tracing
    // (respects the RUST_LOG env var).
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hookd_server=debug")),
        )
        .init();

    info!("Starting hookd server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    let db = Database::open_at(&config.database_path)?;
    let state = AppState {
        db: Arc::new(Mutex::new(db)),
    };

    // tokio::select! ensures that if either the HTTP server or a shutdown
    // signal arrives, we exit cleanly.
    tokio::select! {
        result = api::serve(state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
