//! Per-station climate table and chart models.

use serde::{Deserialize, Serialize};

use super::station::StationResponse;

/// Query parameters for `GET /api/v1/stations/{id}/climate`.
#[derive(Debug, Default, Deserialize)]
pub struct ClimateQuery {
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

/// One row of the climate table: yearly and seasonal temperature means in °C.
///
/// Seasons follow the station's hemisphere, so `winter_*` of a southern
/// station is computed from June to August.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateRow {
    pub year: i32,
    pub yearly_min: Option<f64>,
    pub yearly_max: Option<f64>,
    pub winter_min: Option<f64>,
    pub winter_max: Option<f64>,
    pub spring_min: Option<f64>,
    pub spring_max: Option<f64>,
    pub summer_min: Option<f64>,
    pub summer_max: Option<f64>,
    pub autumn_min: Option<f64>,
    pub autumn_max: Option<f64>,
}

/// A line of the temperature chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Legend label
    pub name: String,
    /// Line colour as `#rrggbb`
    pub color: String,
    /// `(year, value)` pairs; gaps are `null`
    pub points: Vec<(i32, Option<f64>)>,
}

/// Response body for the climate endpoint.
///
/// # JSON Example
///
/// ```json
/// {
///   "station": { "station_id": "GME00102380", "station_name": "NURNBERG", ... },
///   "year_from": 2000,
///   "year_to": 2024,
///   "rows": [ { "year": 2000, "yearly_min": 4.12, "yearly_max": 14.3, ... } ],
///   "series": [ { "name": "Jährlich Min.", "color": "#0000ff", "points": [[2000, 4.12]] } ]
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ClimateResponse {
    pub station: StationResponse,
    pub year_from: i32,
    pub year_to: i32,
    pub rows: Vec<ClimateRow>,
    pub series: Vec<ChartSeries>,
}
