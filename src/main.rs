//! Station Climate Service - Main Application Entry Point
//!
//! This is a REST API server for exploring NOAA GHCN-Daily weather stations. It lets clients find the nearest temperature stations around a coordinate and returns yearly and seasonal temperature tables per station.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Storage**: CSV files under `DATA_DIR` (catalog + per-station cache)
//! - **Upstream**: NOAA GHCN-Daily archive via reqwest
//! - **Format**: JSON responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Download the station catalog if it is missing
//! 3. Load the catalog into memory
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

use station_climate_server::{build_state, config, router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let port = config.server_port;
    let state = build_state(config).await?;

    let app = router(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
