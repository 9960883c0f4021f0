//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use url::Url;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the request/response backend (register, login, posts).
    pub api_base_url: Url,
    /// Endpoint of the persistent notification connection.
    pub feed_url: Url,
    /// File holding the durable session token.
    pub session_path: PathBuf,
    pub log_level: Level,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Backend endpoints ---
        let api_base_url = parse_url("API_BASE_URL", "http://localhost:8081")?;
        let feed_url = parse_url("FEED_URL", "ws://localhost:8081/ws")?;

        let session_path = std::env::var("SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.shop-session.json"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Timeouts ---
        let request_timeout = parse_secs("REQUEST_TIMEOUT_SECS", 10)?;
        let connect_timeout = parse_secs("CONNECT_TIMEOUT_SECS", 10)?;

        Ok(Self {
            api_base_url,
            feed_url,
            session_path,
            log_level,
            request_timeout,
            connect_timeout,
        })
    }
}

fn parse_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string()))
}

fn parse_secs(var: &str, default: u64) -> Result<Duration, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string())),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}
