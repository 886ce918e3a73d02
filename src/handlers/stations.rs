//! Station HTTP handlers.
//!
//! This module implements the station-related API endpoints:
//! - GET /api/v1/map - Default map view with all plottable stations
//! - GET /api/v1/stations/search - Nearest stations around a coordinate
//! - GET /api/v1/stations/:id - Get station by ID

use crate::{
    error::AppError,
    models::station::{
        MapMarker, MapResponse, MapView, StationMatch, StationResponse, StationSearchQuery,
    },
    services::search_service::{self, DEFAULT_LATITUDE, DEFAULT_LONGITUDE, SearchParams},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};

/// Zoom level of the initial map view.
const DEFAULT_ZOOM: u8 = 4;

/// Map data for the station overview.
///
/// # Endpoint
///
/// `GET /api/v1/map`
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "center": { "lat": 48.0458, "lon": 8.4617 },
///   "zoom": 4,
///   "stations": [
///     { "station_id": "GME00102380", "station_name": "NURNBERG", "latitude": 49.503, "longitude": 11.0549 }
///   ]
/// }
/// ```
///
/// Stations without coordinates are left out.
pub async fn map_overview(State(state): State<AppState>) -> Json<MapResponse> {
    let stations = state
        .catalog
        .stations()
        .iter()
        .filter_map(|station| {
            let (latitude, longitude) = station.coordinates()?;
            Some(MapMarker {
                station_id: station.station_id.clone(),
                station_name: station.station_name.clone(),
                latitude,
                longitude,
            })
        })
        .collect();

    Json(MapResponse {
        center: MapView {
            lat: DEFAULT_LATITUDE,
            lon: DEFAULT_LONGITUDE,
        },
        zoom: DEFAULT_ZOOM,
        stations,
    })
}

/// Search the nearest stations around a coordinate.
///
/// # Endpoint
///
/// `GET /api/v1/stations/search`
///
/// # Query Parameters
///
/// - `lat`, `lon` - centre of the search (default: 48.0458, 8.4617)
/// - `radius_km` - 1 to 100 (default: 50)
/// - `count` - 1 to 10 (default: 5)
/// - `year_from`, `year_to` - year range the station must cover (default: 2000 to `MAX_YEAR`)
///
/// # Response
///
/// - **Success (200 OK)**: stations ordered by distance (may be empty)
/// - **Error (400)**: parameter out of range
///
/// ```json
/// [
///   {
///     "station_id": "GME00102380",
///     "station_name": "NURNBERG",
///     "latitude": 49.503,
///     "longitude": 11.0549,
///     "first_year": 1955,
///     "last_year": 2024,
///     "distance_km": 12.34
///   }
/// ]
/// ```
pub async fn search_stations(
    State(state): State<AppState>,
    Query(query): Query<StationSearchQuery>,
) -> Result<Json<Vec<StationMatch>>, AppError> {
    let params = SearchParams::from_query(&query, state.config.max_year)?;
    let matches = search_service::search_stations(state.catalog.stations(), &params);

    tracing::debug!(
        lat = params.latitude,
        lon = params.longitude,
        found = matches.len(),
        "Station search"
    );

    Ok(Json(matches))
}

/// Get a station by ID.
///
/// # Endpoint
///
/// `GET /api/v1/stations/{id}`
///
/// # Response
///
/// - **Success (200 OK)**: station details
/// - **Error (404)**: unknown station id
pub async fn get_station(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> Result<Json<StationResponse>, AppError> {
    let station = state
        .catalog
        .get(&station_id)
        .cloned()
        .ok_or(AppError::StationNotFound)?;

    Ok(Json(station.into()))
}
