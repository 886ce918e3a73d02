//! Nearest-station search.
//!
//! Distances are great-circle distances on a sphere of radius 6371 km.

use crate::{
    error::AppError,
    models::station::{Station, StationMatch, StationSearchQuery},
    services::processing_service::round2,
};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Initial map centre (Villingen-Schwenningen).
pub const DEFAULT_LATITUDE: f64 = 48.0458;
pub const DEFAULT_LONGITUDE: f64 = 8.4617;

pub const DEFAULT_RADIUS_KM: f64 = 50.0;
pub const MAX_RADIUS_KM: f64 = 100.0;
pub const DEFAULT_COUNT: usize = 5;
pub const MAX_COUNT: usize = 10;
pub const DEFAULT_YEAR_FROM: i32 = 2000;

/// Great-circle distance between two points in kilometres (haversine formula).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Which bound of a year range the user changed last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearBound {
    From,
    To,
}

/// An inclusive, clamped year range with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    /// Clamp both bounds to `[0, max_year]` and restore `from <= to`.
    ///
    /// A missing `from` becomes 0 and a missing `to` becomes `max_year`.
    /// If the bounds cross, the one not being edited follows the edited one.
    pub fn reconcile(from: Option<i32>, to: Option<i32>, edited: YearBound, max_year: i32) -> Self {
        let mut from = from.unwrap_or(0).clamp(0, max_year);
        let mut to = to.unwrap_or(max_year).clamp(0, max_year);

        match edited {
            YearBound::From if from > to => to = from,
            YearBound::To if to < from => from = to,
            _ => {}
        }

        Self { from, to }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.from..=self.to).contains(&year)
    }
}

/// Validated parameters of a nearest-station search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub count: usize,
    pub years: YearRange,
}

impl SearchParams {
    /// Apply defaults and validate a search query.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidRequest` for coordinates outside the globe,
    /// a radius outside 1..=100 km or a count outside 1..=10.
    pub fn from_query(query: &StationSearchQuery, max_year: i32) -> Result<Self, AppError> {
        let latitude = query.lat.unwrap_or(DEFAULT_LATITUDE);
        let longitude = query.lon.unwrap_or(DEFAULT_LONGITUDE);
        let radius_km = query.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
        let count = query.count.unwrap_or(DEFAULT_COUNT);

        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::InvalidRequest(
                "lat must be between -90 and 90".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::InvalidRequest(
                "lon must be between -180 and 180".to_string(),
            ));
        }
        if !(1.0..=MAX_RADIUS_KM).contains(&radius_km) {
            return Err(AppError::InvalidRequest(format!(
                "radius_km must be between 1 and {MAX_RADIUS_KM}"
            )));
        }
        if !(1..=MAX_COUNT).contains(&count) {
            return Err(AppError::InvalidRequest(format!(
                "count must be between 1 and {MAX_COUNT}"
            )));
        }

        let years = YearRange::reconcile(
            Some(query.year_from.unwrap_or(DEFAULT_YEAR_FROM)),
            Some(query.year_to.unwrap_or(max_year)),
            YearBound::From,
            max_year,
        );

        Ok(Self {
            latitude,
            longitude,
            radius_km,
            count,
            years,
        })
    }
}

/// Find the `count` nearest stations within the radius covering the year range.
///
/// Results are ordered by ascending distance; ties keep catalog order.
/// Stations without coordinates never match.
pub fn search_stations(catalog: &[Station], params: &SearchParams) -> Vec<StationMatch> {
    let mut hits: Vec<(f64, &Station)> = catalog
        .iter()
        .filter(|station| station.covers(params.years.from, params.years.to))
        .filter_map(|station| {
            let (lat, lon) = station.coordinates()?;
            let distance = haversine_distance(params.latitude, params.longitude, lat, lon);
            (distance <= params.radius_km).then_some((distance, station))
        })
        .collect();

    hits.sort_by(|a, b| a.0.total_cmp(&b.0));

    hits.into_iter()
        .take(params.count)
        .map(|(distance, station)| StationMatch {
            station: station.clone().into(),
            distance_km: round2(distance),
        })
        .collect()
}
