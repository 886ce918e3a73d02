//! HTTP client for the NOAA GHCN-Daily archive.

use crate::{config::Config, error::AppError};
use std::time::Duration;

/// Downloads the station list, the inventory and per-station `.dly` files.
///
/// The underlying `reqwest::Client` is reference counted, so cloning is
/// cheap and clones share one connection pool.
#[derive(Debug, Clone)]
pub struct GhcnClient {
    http: reqwest::Client,
    stations_url: String,
    inventory_url: String,
    daily_base_url: String,
}

impl GhcnClient {
    /// Build a client for the sources named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Download` if the TLS backend cannot be initialised.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            stations_url: config.stations_url.clone(),
            inventory_url: config.inventory_url.clone(),
            daily_base_url: config.daily_base_url.clone(),
        })
    }

    /// Fetch `ghcnd-stations.csv`.
    pub async fn fetch_stations(&self) -> Result<String, AppError> {
        self.get_text(&self.stations_url).await
    }

    /// Fetch `ghcnd-inventory.txt`.
    pub async fn fetch_inventory(&self) -> Result<String, AppError> {
        self.get_text(&self.inventory_url).await
    }

    /// Fetch the `.dly` file of one station.
    pub async fn fetch_daily(&self, station_id: &str) -> Result<String, AppError> {
        let url = daily_url(&self.daily_base_url, station_id)?;
        self.get_text(&url).await
    }

    /// GET `url` and return the body, treating 4xx/5xx as an error.
    async fn get_text(&self, url: &str) -> Result<String, AppError> {
        tracing::debug!("Downloading {}", url);
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Resolve `{station_id}.dly` against the archive base URL.
///
/// A base without a trailing slash is treated as a directory.
fn daily_url(base: &str, station_id: &str) -> Result<String, AppError> {
    let base = if base.ends_with('/') {
        url::Url::parse(base)
    } else {
        url::Url::parse(&format!("{base}/"))
    }
    .map_err(|e| AppError::Processing(format!("Invalid daily base URL {base}: {e}")))?;

    let url = base
        .join(&format!("{station_id}.dly"))
        .map_err(|e| AppError::Processing(format!("Invalid station id {station_id}: {e}")))?;
    Ok(url.into())
}
