//! Climate table HTTP handler.

use crate::{
    error::AppError,
    models::climate::{ClimateQuery, ClimateResponse},
    services::{
        climate_service,
        search_service::{DEFAULT_YEAR_FROM, YearBound, YearRange},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};

/// Yearly and seasonal temperature table of one station.
///
/// # Endpoint
///
/// `GET /api/v1/stations/{id}/climate?year_from=2000&year_to=2024`
///
/// # Behaviour
///
/// The first request for a station downloads and processes its daily data,
/// which may take a while; later requests are served from the on-disk cache.
///
/// # Response
///
/// - **Success (200 OK)**: table rows and chart series for the year range
/// - **Error (404)**: unknown station id
/// - **Error (502)**: NOAA download failed
/// - **Error (504)**: preparing the station took too long
pub async fn get_station_climate(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
    Query(query): Query<ClimateQuery>,
) -> Result<Json<ClimateResponse>, AppError> {
    let station = state
        .catalog
        .get(&station_id)
        .cloned()
        .ok_or(AppError::StationNotFound)?;

    let years = YearRange::reconcile(
        Some(query.year_from.unwrap_or(DEFAULT_YEAR_FROM)),
        query.year_to,
        YearBound::From,
        state.config.max_year,
    );

    let response = climate_service::station_climate(&state.cache, &station, years).await?;
    Ok(Json(response))
}
