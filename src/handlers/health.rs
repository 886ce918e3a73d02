//! Health check endpoint for service monitoring.

use crate::state::AppState;
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response.
///
/// Returns service status and the size of the loaded station catalog.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,

    /// Number of stations held in memory
    pub stations_loaded: usize,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "stations_loaded": 41235,
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
///
/// An empty catalog reports `"degraded"`: the server is up but no search
/// can succeed.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.catalog.is_empty() {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        stations_loaded: state.catalog.len(),
        timestamp: Utc::now(),
    })
}
