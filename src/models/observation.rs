//! Daily observation and aggregate models.
//!
//! These types map one-to-one onto the CSV files kept per station under
//! `<data_dir>/stations/`:
//! - `{id}.csv`: `DailyObservation` rows after download, `CleanObservation` rows after cleaning
//! - `{id}_monthly.csv`: `MonthlyAverage`
//! - `{id}_yearly.csv`: `YearlyAverage`

use serde::{Deserialize, Serialize};

/// Element code of the daily maximum temperature.
pub const TMAX: &str = "TMAX";

/// Element code of the daily minimum temperature.
pub const TMIN: &str = "TMIN";

/// Whether `element` is one of the temperature elements the service keeps.
pub fn is_temperature_element(element: &str) -> bool {
    element == TMAX || element == TMIN
}

/// One non-missing daily value from a `.dly` file.
///
/// `value` is in the element's native unit (tenths of °C for temperatures).
/// Flags are single characters and are often blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    #[serde(rename = "Station_ID")]
    pub station_id: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Element")]
    pub element: String,
    #[serde(rename = "Value")]
    pub value: i32,
    #[serde(rename = "Quality_Flag")]
    pub quality_flag: String,
    #[serde(rename = "Measurement_Flag")]
    pub measurement_flag: String,
    #[serde(rename = "Source_Flag")]
    pub source_flag: String,
}

/// A temperature observation in °C without flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanObservation {
    #[serde(rename = "Station_ID")]
    pub station_id: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Element")]
    pub element: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// Mean TMAX/TMIN of one calendar month.
///
/// An element without any observation in that month is `None`
/// (written as an empty cell).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverage {
    #[serde(rename = "Station_ID")]
    pub station_id: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
}

/// Mean of the monthly averages of one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyAverage {
    #[serde(rename = "Station_ID")]
    pub station_id: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
}
