//! On-disk storage layout and CSV persistence.
//!
//! This module provides utilities for:
//! - Resolving the paths of the catalog and per-station files
//! - Creating the data directory tree on startup
//! - Reading and writing typed CSV files

use crate::error::AppError;
use serde::{Serialize, de::DeserializeOwned};
use std::fs;
use std::path::{Path, PathBuf};

const RAW_SUFFIX: &str = ".csv";
const MONTHLY_SUFFIX: &str = "_monthly.csv";
const YEARLY_SUFFIX: &str = "_yearly.csv";

/// Handle to the data directory.
///
/// # Layout
///
/// ```text
/// <root>/stations.csv                 processed station catalog
/// <root>/stations/{id}.csv            raw, later cleaned, daily observations
/// <root>/stations/{id}_monthly.csv    monthly averages
/// <root>/stations/{id}_yearly.csv     yearly averages
/// ```
#[derive(Debug, Clone)]
pub struct StationStore {
    root: PathBuf,
}

impl StationStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the data directory and its `stations/` subfolder if missing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if a directory cannot be created.
    pub fn ensure_layout(&self) -> Result<(), AppError> {
        fs::create_dir_all(self.stations_dir())?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join("stations.csv")
    }

    pub fn stations_dir(&self) -> PathBuf {
        self.root.join("stations")
    }

    pub fn raw_path(&self, station_id: &str) -> PathBuf {
        self.stations_dir().join(format!("{station_id}{RAW_SUFFIX}"))
    }

    pub fn monthly_path(&self, station_id: &str) -> PathBuf {
        self.stations_dir().join(format!("{station_id}{MONTHLY_SUFFIX}"))
    }

    pub fn yearly_path(&self, station_id: &str) -> PathBuf {
        self.stations_dir().join(format!("{station_id}{YEARLY_SUFFIX}"))
    }

    /// Station id owning a file in `stations/`, if the name is one of ours.
    pub fn station_id_of(file_name: &str) -> Option<&str> {
        [YEARLY_SUFFIX, MONTHLY_SUFFIX, RAW_SUFFIX]
            .iter()
            .find_map(|suffix| file_name.strip_suffix(*suffix))
            .filter(|id| !id.is_empty())
    }

    /// All three files belonging to a station, in pipeline order.
    pub fn station_files(&self, station_id: &str) -> [PathBuf; 3] {
        [
            self.raw_path(station_id),
            self.monthly_path(station_id),
            self.yearly_path(station_id),
        ]
    }

    /// Whether the catalog file exists and holds any bytes.
    pub fn has_catalog(&self) -> bool {
        fs::metadata(self.catalog_path())
            .map(|meta| meta.len() > 0)
            .unwrap_or(false)
    }

    /// Whether monthly and yearly aggregates of a station are present.
    pub fn is_prepared(&self, station_id: &str) -> bool {
        self.monthly_path(station_id).exists() && self.yearly_path(station_id).exists()
    }
}

/// Write `rows` to `path` as CSV with a header row.
///
/// An empty slice still produces a header-only file, so later steps can
/// tell "no data" apart from "not downloaded".
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T], header: &[&str]) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read every row of a headed CSV file at `path`.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<T>, csv::Error>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::observation::MonthlyAverage;
    use tempfile::TempDir;

    #[test]
    fn paths_follow_station_id() {
        let store = StationStore::new("/data");
        assert_eq!(store.catalog_path(), PathBuf::from("/data/stations.csv"));
        assert_eq!(
            store.monthly_path("GME00102380"),
            PathBuf::from("/data/stations/GME00102380_monthly.csv")
        );
        assert_eq!(
            store.yearly_path("GME00102380"),
            PathBuf::from("/data/stations/GME00102380_yearly.csv")
        );
    }

    #[test]
    fn station_files_map_back_to_their_id() {
        assert_eq!(StationStore::station_id_of("GME00102380_yearly.csv"), Some("GME00102380"));
        assert_eq!(StationStore::station_id_of("GME00102380_monthly.csv"), Some("GME00102380"));
        assert_eq!(StationStore::station_id_of("GME00102380.csv"), Some("GME00102380"));
        assert_eq!(StationStore::station_id_of("notes.txt"), None);
        assert_eq!(StationStore::station_id_of(".csv"), None);
    }

    #[test]
    fn empty_catalog_counts_as_missing() {
        let dir = TempDir::new().unwrap();
        let store = StationStore::new(dir.path());
        store.ensure_layout().unwrap();
        assert!(!store.has_catalog());

        fs::write(store.catalog_path(), "").unwrap();
        assert!(!store.has_catalog());

        fs::write(store.catalog_path(), "Station_ID\n").unwrap();
        assert!(store.has_catalog());
    }

    #[test]
    fn missing_values_are_written_as_empty_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.csv");
        let rows = vec![MonthlyAverage {
            station_id: "X".into(),
            year: 2001,
            month: 3,
            tmax: Some(12.5),
            tmin: None,
        }];
        write_csv(&path, &rows, &["Station_ID", "Year", "Month", "TMAX", "TMIN"]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Station_ID,Year,Month,TMAX,TMIN\nX,2001,3,12.5,\n");

        let back: Vec<MonthlyAverage> = read_csv(&path).unwrap();
        assert_eq!(back, rows);
    }
}
