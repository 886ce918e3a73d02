//! Station catalog models and API request/response types.
//!
//! This module defines:
//! - `Station`: a row of `stations.csv`
//! - `StationSearchQuery`: query parameters of the nearest-station search
//! - `StationResponse` / `StationMatch`: response bodies returned to clients
//! - `MapResponse`: the default map view with every plottable station

use serde::{Deserialize, Serialize};

/// Represents a station record of the processed catalog file.
///
/// # File Layout
///
/// Maps to `stations.csv` with the header
/// `Station_ID,Latitude,Longitude,FirstYear,LastYear,Station_Name`.
///
/// Only stations reporting TMAX or TMIN carry coordinates and a year range.
/// Stations absent from the inventory keep empty coordinates and years of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// GHCN station identifier (11 characters, e.g. `GME00102380`)
    #[serde(rename = "Station_ID")]
    pub station_id: String,

    #[serde(rename = "Latitude")]
    pub latitude: Option<f64>,

    #[serde(rename = "Longitude")]
    pub longitude: Option<f64>,

    /// Latest first year among the TMAX/TMIN series
    ///
    /// Taking the maximum guarantees both elements are reported from here on.
    #[serde(rename = "FirstYear")]
    pub first_year: i32,

    /// Earliest last year among the TMAX/TMIN series
    #[serde(rename = "LastYear")]
    pub last_year: i32,

    #[serde(rename = "Station_Name")]
    pub station_name: String,
}

impl Station {
    /// Coordinates of the station, if known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Whether the reported year range overlaps `[from, to]`.
    pub fn covers(&self, from: i32, to: i32) -> bool {
        self.first_year <= to && self.last_year >= from
    }
}

/// Query parameters for `GET /api/v1/stations/search`.
///
/// # Example
///
/// `/api/v1/stations/search?lat=48.0458&lon=8.4617&radius_km=50&count=5&year_from=2000&year_to=2024`
///
/// Every field is optional; defaults reproduce the initial dashboard view
/// centred on Villingen-Schwenningen.
#[derive(Debug, Default, Deserialize)]
pub struct StationSearchQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
    pub count: Option<usize>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

/// Response body describing a single station.
///
/// # JSON Example
///
/// ```json
/// {
///   "station_id": "GME00102380",
///   "station_name": "NURNBERG",
///   "latitude": 49.503,
///   "longitude": 11.0549,
///   "first_year": 1955,
///   "last_year": 2024
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationResponse {
    pub station_id: String,
    pub station_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub first_year: i32,
    pub last_year: i32,
}

impl From<Station> for StationResponse {
    fn from(station: Station) -> Self {
        Self {
            station_id: station.station_id,
            station_name: station.station_name,
            latitude: station.latitude,
            longitude: station.longitude,
            first_year: station.first_year,
            last_year: station.last_year,
        }
    }
}

/// A search hit: the station and its great-circle distance to the query point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationMatch {
    #[serde(flatten)]
    pub station: StationResponse,

    /// Distance in kilometres, rounded to 2 decimals
    pub distance_km: f64,
}

/// Map centre.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MapView {
    pub lat: f64,
    pub lon: f64,
}

/// A plottable station marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapMarker {
    pub station_id: String,
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Response body for `GET /api/v1/map`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MapResponse {
    pub center: MapView,
    pub zoom: u8,
    pub stations: Vec<MapMarker>,
}
