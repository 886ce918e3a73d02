//! Station catalog service.
//!
//! This service builds `stations.csv` from the NOAA station list and the
//! element inventory, and loads it back into memory at startup.
//!
//! # Catalog Rules
//!
//! - Only inventory rows for TMAX and TMIN are considered
//! - Coordinates come from the first matching inventory row
//! - `FirstYear` is the latest start and `LastYear` the earliest end over both
//!   elements, so the range is the one where both are reported
//! - Stations without temperature inventory keep empty coordinates and years of 0

use crate::{
    error::AppError,
    models::{observation::is_temperature_element, station::Station},
    services::ghcn_client::GhcnClient,
    store::{self, StationStore},
};
use std::collections::{BTreeMap, HashMap};
use std::fs;

const CATALOG_HEADER: [&str; 6] = [
    "Station_ID",
    "Latitude",
    "Longitude",
    "FirstYear",
    "LastYear",
    "Station_Name",
];

/// A temperature row of `ghcnd-inventory.txt`.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryEntry {
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub element: String,
    pub first_year: i32,
    pub last_year: i32,
}

/// Parse the whitespace separated inventory, keeping TMAX/TMIN rows only.
///
/// Lines with fewer than six fields or unparsable numbers are skipped.
pub fn parse_inventory(text: &str) -> Vec<InventoryEntry> {
    text.lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 || !is_temperature_element(fields[3]) {
                return None;
            }
            Some(InventoryEntry {
                station_id: fields[0].to_string(),
                latitude: fields[1].parse().ok()?,
                longitude: fields[2].parse().ok()?,
                element: fields[3].to_string(),
                first_year: fields[4].parse().ok()?,
                last_year: fields[5].parse().ok()?,
            })
        })
        .collect()
}

/// Parse the header-less station list into `(id, name)` pairs.
///
/// Column 0 holds the identifier, column 5 the station name.
pub fn parse_station_names(text: &str) -> Result<Vec<(String, String)>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut names = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(id) = record.get(0).map(str::trim).filter(|id| !id.is_empty()) else {
            continue;
        };
        let name = record.get(5).map(str::trim).unwrap_or_default();
        names.push((id.to_string(), name.to_string()));
    }
    Ok(names)
}

/// Left-join station names with the temperature inventory and group by id.
///
/// The result is sorted by station id.
pub fn build_catalog(names: &[(String, String)], inventory: &[InventoryEntry]) -> Vec<Station> {
    let mut by_station: HashMap<&str, Vec<&InventoryEntry>> = HashMap::new();
    for entry in inventory {
        by_station.entry(entry.station_id.as_str()).or_default().push(entry);
    }

    let mut catalog: BTreeMap<&str, Station> = BTreeMap::new();
    for (id, name) in names {
        if catalog.contains_key(id.as_str()) {
            continue;
        }

        let entries = by_station.get(id.as_str()).map(Vec::as_slice).unwrap_or_default();
        let station = Station {
            station_id: id.clone(),
            latitude: entries.first().map(|e| e.latitude),
            longitude: entries.first().map(|e| e.longitude),
            first_year: entries.iter().map(|e| e.first_year).max().unwrap_or(0),
            last_year: entries.iter().map(|e| e.last_year).min().unwrap_or(0),
            station_name: name.clone(),
        };
        catalog.insert(id.as_str(), station);
    }

    catalog.into_values().collect()
}

/// Download and process the station catalog unless it already exists.
///
/// # Process
///
/// 1. Ensure the data directory layout exists
/// 2. Skip if `stations.csv` exists and is non-empty
/// 3. Download station list and inventory
/// 4. Build and write the catalog
///
/// The inventory is only held in memory and never written to disk.
///
/// # Errors
///
/// - `Download`: a NOAA file could not be fetched
/// - `Io` / `Csv`: the catalog could not be written
pub async fn initialize_stations_data(
    store: &StationStore,
    client: &GhcnClient,
) -> Result<(), AppError> {
    store.ensure_layout()?;

    if store.has_catalog() {
        tracing::info!("Stations data already exists. Skipping initialization.");
        return Ok(());
    }

    let stations_text = client.fetch_stations().await?;
    tracing::info!("Station list successfully downloaded");

    let inventory_text = client.fetch_inventory().await?;
    tracing::info!("Inventory successfully downloaded");

    let store = store.clone();
    tokio::task::spawn_blocking(move || -> Result<(), AppError> {
        let names = parse_station_names(&stations_text)?;
        let inventory = parse_inventory(&inventory_text);
        let catalog = build_catalog(&names, &inventory);

        store::write_csv(&store.catalog_path(), &catalog, &CATALOG_HEADER)?;
        tracing::info!(
            stations = catalog.len(),
            "Saved processed station data to {}",
            store.catalog_path().display()
        );
        Ok(())
    })
    .await?
}

/// Read the processed catalog from disk.
///
/// # Errors
///
/// Returns `AppError::Processing` if the file is missing, otherwise the
/// underlying CSV error for malformed rows.
pub fn load_catalog(store: &StationStore) -> Result<Vec<Station>, AppError> {
    let path = store.catalog_path();
    if fs::metadata(&path).is_err() {
        return Err(AppError::Processing(format!(
            "Station catalog {} does not exist",
            path.display()
        )));
    }
    store::read_csv(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY: &str = "\
GME00102380  49.5030   11.0549 TMAX 1955 2024
GME00102380  49.5030   11.0549 TMIN 1950 2023
GME00102380  49.5030   11.0549 PRCP 1900 2024
ASN00066037 -33.9465  151.1731 TMAX 1939 2024
ASN00066037 -33.9465  151.1731 TMIN 1939 2024
ZZZ00000000  10.0000   10.0000 TMAX 2000 2010
broken line
";

    const STATIONS: &str = "\
GME00102380,49.503,11.0549,314.0,,NURNBERG,,,10763
ASN00066037,-33.9465,151.1731,6.0,,SYDNEY AIRPORT AMO,,,94767
AAA00000001,0.0,0.0,0.0,,NO TEMPERATURE,,,
";

    #[test]
    fn inventory_keeps_only_temperature_rows() {
        let rows = parse_inventory(INVENTORY);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.element == "TMAX" || r.element == "TMIN"));
    }

    #[test]
    fn catalog_narrows_year_range_to_both_elements() {
        let names = parse_station_names(STATIONS).unwrap();
        let catalog = build_catalog(&names, &parse_inventory(INVENTORY));

        let nurnberg = catalog
            .iter()
            .find(|s| s.station_id == "GME00102380")
            .unwrap();
        assert_eq!(nurnberg.station_name, "NURNBERG");
        assert_eq!(nurnberg.first_year, 1955);
        assert_eq!(nurnberg.last_year, 2023);
        assert_eq!(nurnberg.coordinates(), Some((49.503, 11.0549)));
    }

    #[test]
    fn catalog_is_a_left_join_sorted_by_id() {
        let names = parse_station_names(STATIONS).unwrap();
        let catalog = build_catalog(&names, &parse_inventory(INVENTORY));

        let ids: Vec<&str> = catalog.iter().map(|s| s.station_id.as_str()).collect();
        assert_eq!(ids, vec!["AAA00000001", "ASN00066037", "GME00102380"]);

        let orphan = &catalog[0];
        assert_eq!(orphan.coordinates(), None);
        assert_eq!((orphan.first_year, orphan.last_year), (0, 0));
    }
}
