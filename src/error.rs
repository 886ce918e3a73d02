//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Message shown to clients when a station cannot be prepared.
pub const STATION_LOAD_FAILED: &str =
    "Probleme beim Laden der Stationsdaten, versuche es später erneut";

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Upstream Errors**: NOAA downloads that failed or returned an error status
/// - **Storage Errors**: reading or writing the CSV files under the data directory
/// - **Resource Errors**: requested station not in the catalog
/// - **Validation Errors**: invalid query parameters
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Download from NOAA failed (connection error, 4xx/5xx status).
    ///
    /// Returns HTTP 502 Bad Gateway.
    #[error("Download error: {0}")]
    Download(#[from] reqwest::Error),

    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A CSV file could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Data could not be processed (malformed source file, missing rows).
    #[error("Processing error: {0}")]
    Processing(String),

    /// A blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Preparing station data took longer than the configured limit.
    ///
    /// Returns HTTP 504 Gateway Timeout.
    #[error("Station data loading timed out")]
    Timeout,

    /// Requested station does not exist in the catalog.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Station not found")]
    StationNotFound,

    /// Request parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `StationNotFound` → 404 Not Found
/// - `InvalidRequest` → 400 Bad Request
/// - `Timeout` → 504 Gateway Timeout
/// - `Download` → 502 Bad Gateway
/// - `Io`, `Csv`, `Processing`, `Join` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::StationNotFound => {
                (StatusCode::NOT_FOUND, "station_not_found", self.to_string())
            }
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "station_load_timeout",
                STATION_LOAD_FAILED.to_string(),
            ),
            AppError::Download(ref err) => {
                tracing::error!("Upstream download failed: {}", err);
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    STATION_LOAD_FAILED.to_string(),
                )
            }
            AppError::Io(_) | AppError::Csv(_) | AppError::Processing(_) | AppError::Join(_) => {
                tracing::error!("Error processing station data: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    STATION_LOAD_FAILED.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_variant() {
        assert_eq!(
            AppError::StationNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidRequest("radius_km".into())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Timeout.into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            AppError::Processing("empty".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
