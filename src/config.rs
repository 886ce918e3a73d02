//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 8050
/// - `DATA_DIR` (optional): root directory for station files, defaults to `./data`
/// - `STATIONS_URL`, `INVENTORY_URL`, `DAILY_BASE_URL` (optional): NOAA GHCN-Daily sources
/// - `CACHE_CAPACITY` (optional): number of processed stations kept on disk, defaults to 10
/// - `LOAD_TIMEOUT_SECS` (optional): limit for preparing a single station, defaults to 120
/// - `HTTP_TIMEOUT_SECS` (optional): timeout of each outbound request, defaults to 60
/// - `MAX_YEAR` (optional): upper bound accepted for year inputs, defaults to 2024
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_stations_url")]
    pub stations_url: String,

    #[serde(default = "default_inventory_url")]
    pub inventory_url: String,

    #[serde(default = "default_daily_base_url")]
    pub daily_base_url: String,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    8050
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_stations_url() -> String {
    "https://www1.ncdc.noaa.gov/pub/data/ghcn/daily/ghcnd-stations.csv".to_string()
}

fn default_inventory_url() -> String {
    "https://www1.ncdc.noaa.gov/pub/data/ghcn/daily/ghcnd-inventory.txt".to_string()
}

fn default_daily_base_url() -> String {
    "https://www.ncei.noaa.gov/pub/data/ghcn/daily/all/".to_string()
}

fn default_cache_capacity() -> usize {
    10
}

fn default_load_timeout_secs() -> u64 {
    120
}

fn default_http_timeout_secs() -> u64 {
    60
}

fn default_max_year() -> i32 {
    2024
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable value cannot be parsed
    /// into the expected type (e.g. `SERVER_PORT=abc`).
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: data_dir -> DATA_DIR
        envy::from_env::<Config>()
    }

    /// Configuration with every default applied, rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            server_port: default_port(),
            data_dir: data_dir.into(),
            stations_url: default_stations_url(),
            inventory_url: default_inventory_url(),
            daily_base_url: default_daily_base_url(),
            cache_capacity: default_cache_capacity(),
            load_timeout_secs: default_load_timeout_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            max_year: default_max_year(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_packaged_service() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.server_port, 8050);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.max_year, 2024);
        assert!(config.daily_base_url.ends_with("/daily/all/"));
    }

    #[test]
    fn env_values_override_defaults() {
        let vars = vec![
            ("SERVER_PORT".to_string(), "9000".to_string()),
            ("DATA_DIR".to_string(), "/tmp/ghcn".to_string()),
            ("CACHE_CAPACITY".to_string(), "3".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.server_port, 9000);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/ghcn"));
        assert_eq!(config.cache_capacity, 3);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let vars = vec![("SERVER_PORT".to_string(), "not-a-port".to_string())];
        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }
}
