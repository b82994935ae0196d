// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use crate::services::normalize::DEFAULT_MOTION_THRESHOLD_KMH;
use std::env;
use std::time::Duration;

/// Which [`crate::db::VehicleStore`] the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Firestore,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "firestore" => Ok(StorageBackend::Firestore),
            _ => Err(ConfigError::Invalid("STORAGE_BACKEND")),
        }
    }
}

/// Server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Dashboard URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore backend)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Storage backend
    pub storage: StorageBackend,
    /// Reports strictly above this speed are classified as moving
    pub motion_threshold_kmh: i64,
    /// JWT signing key for dashboard sessions (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "memory".to_string())
                .parse()?,
            motion_threshold_kmh: match env::var("MOTION_THRESHOLD_KMH") {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("MOTION_THRESHOLD_KMH"))?,
                Err(_) => DEFAULT_MOTION_THRESHOLD_KMH,
            },
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            storage: StorageBackend::Memory,
            motion_threshold_kmh: DEFAULT_MOTION_THRESHOLD_KMH,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Default interval between vehicle snapshot fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Default cap on a single snapshot fetch. Kept below the poll interval.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(1500);
/// Default camera zoom when flying to a selected vehicle.
pub const DEFAULT_FLY_TO_ZOOM: f64 = 16.0;
/// Default fly-to animation length.
pub const DEFAULT_FLY_TO_DURATION: Duration = Duration::from_millis(1500);

/// Headless dashboard configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the fleet API
    pub api_url: String,
    /// Session token sent as a bearer token
    pub token: Option<String>,
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
    pub fly_to_zoom: f64,
    pub fly_to_duration: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            token: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            fly_to_zoom: DEFAULT_FLY_TO_ZOOM,
            fly_to_duration: DEFAULT_FLY_TO_DURATION,
        }
    }
}

impl DashboardConfig {
    /// Load dashboard configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let poll_interval = millis_var("POLL_INTERVAL_MS")?.unwrap_or(defaults.poll_interval);
        let fetch_timeout = millis_var("FETCH_TIMEOUT_MS")?.unwrap_or(defaults.fetch_timeout);

        if fetch_timeout >= poll_interval {
            return Err(ConfigError::Invalid("FETCH_TIMEOUT_MS"));
        }

        Ok(Self {
            api_url: env::var("FLEET_API_URL").unwrap_or(defaults.api_url),
            token: env::var("FLEET_API_TOKEN").ok().map(|t| t.trim().to_string()),
            poll_interval,
            fetch_timeout,
            fly_to_zoom: match env::var("FLY_TO_ZOOM") {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("FLY_TO_ZOOM"))?,
                Err(_) => defaults.fly_to_zoom,
            },
            fly_to_duration: millis_var("FLY_TO_DURATION_MS")?.unwrap_or(defaults.fly_to_duration),
        })
    }
}

fn millis_var(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("STORAGE_BACKEND", "Memory");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.motion_threshold_kmh, 2);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(
            "firestore".parse::<StorageBackend>().unwrap(),
            StorageBackend::Firestore
        );
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_dashboard_defaults_keep_timeout_below_interval() {
        let config = DashboardConfig::default();
        assert!(config.fetch_timeout < config.poll_interval);
        assert_eq!(config.fly_to_zoom, 16.0);
    }
}
