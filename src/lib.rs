//! Weather station climate service.
//!
//! Serves the NOAA GHCN-Daily station catalog over HTTP: nearest-station
//! search around a coordinate and per-station yearly/seasonal temperature
//! tables built on demand from daily observations.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    error::AppError,
    services::{cache_service::StationCache, catalog_service, ghcn_client::GhcnClient},
    state::{AppState, StationCatalog},
    store::StationStore,
};

/// Prepare everything the handlers need.
///
/// # Startup Flow
///
/// 1. Create the data directory layout
/// 2. Download and build the station catalog unless `stations.csv` exists
/// 3. Load the catalog into memory
/// 4. Set up the on-disk station cache
///
/// # Errors
///
/// Fails if the catalog can neither be found nor downloaded.
pub async fn build_state(config: Config) -> Result<AppState, AppError> {
    let store = StationStore::new(&config.data_dir);
    let client = GhcnClient::new(&config)?;

    catalog_service::initialize_stations_data(&store, &client).await?;

    let loader = store.clone();
    let stations =
        tokio::task::spawn_blocking(move || catalog_service::load_catalog(&loader)).await??;
    tracing::info!("Loaded {} stations", stations.len());

    let cache = StationCache::new(
        store,
        client,
        config.cache_capacity,
        Duration::from_secs(config.load_timeout_secs),
    );

    Ok(AppState {
        config: Arc::new(config),
        catalog: Arc::new(StationCatalog::new(stations)),
        cache,
    })
}

/// Build the HTTP router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/map", get(handlers::stations::map_overview))
        .route(
            "/api/v1/stations/search",
            get(handlers::stations::search_stations),
        )
        .route(
            "/api/v1/stations/{id}",
            get(handlers::stations::get_station),
        )
        .route(
            "/api/v1/stations/{id}/climate",
            get(handlers::climate::get_station_climate),
        )
        // Dashboards are usually served from another origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
