//! Shared application state handed to every handler.

use crate::{config::Config, models::station::Station, services::cache_service::StationCache};
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory station catalog with an id index.
#[derive(Debug, Default)]
pub struct StationCatalog {
    stations: Vec<Station>,
    index: HashMap<String, usize>,
}

impl StationCatalog {
    pub fn new(stations: Vec<Station>) -> Self {
        let index = stations
            .iter()
            .enumerate()
            .map(|(i, station)| (station.station_id.clone(), i))
            .collect();
        Self { stations, index }
    }

    pub fn get(&self, station_id: &str) -> Option<&Station> {
        self.index.get(station_id).map(|&i| &self.stations[i])
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// State extracted by handlers via `State<AppState>`.
///
/// Cloning is cheap: the catalog and configuration are behind `Arc`s and
/// the cache shares its lock and HTTP client.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<StationCatalog>,
    pub cache: StationCache,
}
