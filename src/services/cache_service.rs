//! Bounded on-disk cache of processed stations.
//!
//! A station is cached once its monthly and yearly files exist. When a new
//! station has to be prepared and the cache is full, the station whose files
//! were created first is evicted.
//!
//! Files under `stations/` are guarded by one read/write lock: reads of
//! aggregates share it, eviction and the pipeline hold it exclusively.

use crate::{
    error::AppError,
    models::observation::{MonthlyAverage, YearlyAverage},
    services::{ghcn_client::GhcnClient, processing_service},
    store::{self, StationStore},
};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::{OwnedRwLockReadGuard, RwLock};

/// Monthly and yearly rows of one station, read under the cache lock.
#[derive(Debug, Clone)]
pub struct StationAggregates {
    pub monthly: Vec<MonthlyAverage>,
    pub yearly: Vec<YearlyAverage>,
}

/// Prepares station files on demand and keeps at most `capacity` of them.
///
/// Preparation is serialized: concurrent requests for the same station
/// wait for the first one and then find the files already present.
#[derive(Debug, Clone)]
pub struct StationCache {
    store: StationStore,
    client: GhcnClient,
    capacity: usize,
    load_timeout: Duration,
    lock: Arc<RwLock<()>>,
}

impl StationCache {
    pub fn new(
        store: StationStore,
        client: GhcnClient,
        capacity: usize,
        load_timeout: Duration,
    ) -> Self {
        Self {
            store,
            client,
            capacity: capacity.max(1),
            load_timeout,
            lock: Arc::new(RwLock::new(())),
        }
    }

    /// Read the aggregates of `station_id`, preparing them first on a miss.
    ///
    /// # Process
    ///
    /// 1. Under the shared lock, read both files if the station is prepared
    /// 2. Otherwise, in a background task holding the exclusive lock, evict
    ///    the oldest stations until there is room for one more and run
    ///    download, clean, monthly and yearly steps
    /// 3. Downgrade to the shared lock and read both files
    ///
    /// On timeout the caller stops waiting but the background task keeps the
    /// lock until its pipeline is done, so no other request sees its files
    /// half written.
    ///
    /// # Errors
    ///
    /// - `Timeout`: the whole load exceeded the configured limit
    /// - any error of the pipeline steps; partial files are removed
    pub async fn load(&self, station_id: &str) -> Result<StationAggregates, AppError> {
        tokio::time::timeout(self.load_timeout, self.load_or_prepare(station_id))
            .await
            .map_err(|_| {
                tracing::error!("Timed out preparing station {}", station_id);
                AppError::Timeout
            })?
    }

    async fn load_or_prepare(&self, station_id: &str) -> Result<StationAggregates, AppError> {
        let shared = self.lock.clone().read_owned().await;
        if self.store.is_prepared(station_id) {
            return read_aggregates(self.store.clone(), station_id.to_string(), shared).await;
        }
        drop(shared);

        let cache = self.clone();
        let id = station_id.to_string();
        tokio::spawn(async move {
            let exclusive = cache.lock.clone().write_owned().await;

            // Another request may have finished while we waited for the lock.
            if !cache.store.is_prepared(&id) {
                cache.prepare(&id).await?;
            }
            read_aggregates(cache.store.clone(), id, exclusive.downgrade()).await
        })
        .await?
    }

    /// Evict and run the pipeline. Caller holds the exclusive lock.
    async fn prepare(&self, station_id: &str) -> Result<(), AppError> {
        let store = self.store.clone();
        let capacity = self.capacity;
        tokio::task::spawn_blocking(move || evict_to_capacity(&store, capacity)).await??;

        let result = processing_service::process_station(&self.store, &self.client, station_id).await;
        if result.is_err() {
            discard_station(&self.store, station_id);
        }
        result
    }
}

async fn read_aggregates(
    store: StationStore,
    station_id: String,
    guard: OwnedRwLockReadGuard<()>,
) -> Result<StationAggregates, AppError> {
    tokio::task::spawn_blocking(move || -> Result<StationAggregates, AppError> {
        let _guard = guard;
        Ok(StationAggregates {
            monthly: store::read_csv(&store.monthly_path(&station_id))?,
            yearly: store::read_csv(&store.yearly_path(&station_id))?,
        })
    })
    .await?
}

/// Ids of all stations with at least one file in `stations/`.
///
/// Raw-only stations count too, so leftovers of an interrupted run are
/// still evicted.
pub fn cached_stations(store: &StationStore) -> Result<Vec<String>, AppError> {
    let mut ids = BTreeSet::new();
    for entry in fs::read_dir(store.stations_dir())? {
        let name = entry?.file_name();
        if let Some(id) = name.to_str().and_then(StationStore::station_id_of) {
            ids.insert(id.to_string());
        }
    }
    Ok(ids.into_iter().collect())
}

/// Remove the oldest stations until fewer than `capacity` remain.
///
/// Returns the evicted station ids in eviction order.
pub fn evict_to_capacity(store: &StationStore, capacity: usize) -> Result<Vec<String>, AppError> {
    let mut aged: Vec<(String, SystemTime)> = Vec::new();
    for id in cached_stations(store)? {
        if let Some(created) = station_created_at(store, &id) {
            aged.push((id, created));
        }
    }
    aged.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let excess = (aged.len() + 1).saturating_sub(capacity);
    let mut evicted = Vec::with_capacity(excess);
    for (id, _) in aged.into_iter().take(excess) {
        for path in store.station_files(&id) {
            remove_if_exists(&path)?;
        }
        tracing::info!("Evicted cached station {}", id);
        evicted.push(id);
    }
    Ok(evicted)
}

/// Earliest creation time among the station's existing files.
fn station_created_at(store: &StationStore, station_id: &str) -> Option<SystemTime> {
    store
        .station_files(station_id)
        .iter()
        .filter_map(|path| fs::metadata(path).ok())
        .filter_map(|meta| meta.created().or_else(|_| meta.modified()).ok())
        .min()
}

/// Remove whatever a failed pipeline left behind.
fn discard_station(store: &StationStore, station_id: &str) {
    for path in store.station_files(station_id) {
        if let Err(e) = remove_if_exists(&path) {
            tracing::warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<(), AppError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch_station(store: &StationStore, id: &str) {
        for path in store.station_files(id) {
            fs::write(path, "x").unwrap();
        }
        // Creation timestamps need to differ between stations.
        std::thread::sleep(Duration::from_millis(20));
    }

    #[test]
    fn full_cache_evicts_oldest_station() {
        let dir = TempDir::new().unwrap();
        let store = StationStore::new(dir.path());
        store.ensure_layout().unwrap();

        touch_station(&store, "OLD00000001");
        touch_station(&store, "MID00000002");
        touch_station(&store, "NEW00000003");

        let evicted = evict_to_capacity(&store, 3).unwrap();
        assert_eq!(evicted, vec!["OLD00000001".to_string()]);
        assert!(!store.raw_path("OLD00000001").exists());
        assert!(!store.monthly_path("OLD00000001").exists());
        assert_eq!(
            cached_stations(&store).unwrap(),
            vec!["MID00000002".to_string(), "NEW00000003".to_string()]
        );
    }

    #[test]
    fn cache_with_room_is_untouched() {
        let dir = TempDir::new().unwrap();
        let store = StationStore::new(dir.path());
        store.ensure_layout().unwrap();

        touch_station(&store, "A0000000001");
        touch_station(&store, "B0000000002");

        assert!(evict_to_capacity(&store, 10).unwrap().is_empty());
        assert_eq!(cached_stations(&store).unwrap().len(), 2);
    }

    #[test]
    fn raw_only_leftovers_are_evicted() {
        let dir = TempDir::new().unwrap();
        let store = StationStore::new(dir.path());
        store.ensure_layout().unwrap();

        fs::write(store.raw_path("BROKEN00001"), "x").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        touch_station(&store, "FRESH000002");

        assert_eq!(
            cached_stations(&store).unwrap(),
            vec!["BROKEN00001".to_string(), "FRESH000002".to_string()]
        );
        let evicted = evict_to_capacity(&store, 2).unwrap();
        assert_eq!(evicted, vec!["BROKEN00001".to_string()]);
        assert!(!store.raw_path("BROKEN00001").exists());
        assert!(store.is_prepared("FRESH000002"));
    }

    #[test]
    fn discarding_a_station_removes_partial_files() {
        let dir = TempDir::new().unwrap();
        let store = StationStore::new(dir.path());
        store.ensure_layout().unwrap();

        fs::write(store.raw_path("HALF0000001"), "x").unwrap();
        fs::write(store.monthly_path("HALF0000001"), "x").unwrap();
        discard_station(&store, "HALF0000001");

        assert!(cached_stations(&store).unwrap().is_empty());
    }

    #[test]
    fn eviction_tolerates_partial_station_files() {
        let dir = TempDir::new().unwrap();
        let store = StationStore::new(dir.path());
        store.ensure_layout().unwrap();

        fs::write(store.yearly_path("PARTIAL0001"), "x").unwrap();
        let evicted = evict_to_capacity(&store, 1).unwrap();
        assert_eq!(evicted, vec!["PARTIAL0001".to_string()]);
        assert!(cached_stations(&store).unwrap().is_empty());
    }
}
