//! Client configuration loaded from environment variables.
//!
//! Everything is resolved once at startup; components receive the values
//! they need by constructor injection rather than re-reading the
//! environment.

use std::env;
use std::path::PathBuf;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the GoNotes API, e.g. `https://notes.example.com`
    pub base_url: String,
    /// Path of the persisted session file
    pub session_file: PathBuf,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            session_file: PathBuf::from("gonotes_session.json"),
            connect_timeout_secs: 30,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `GONOTES_BASE_URL` is required; everything else falls back to the
    /// defaults the service ships with (30 s timeouts).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            base_url: env::var("GONOTES_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("GONOTES_BASE_URL"))?,
            session_file: env::var("GONOTES_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("gonotes_session.json")),
            connect_timeout_secs: env::var("GONOTES_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            request_timeout_secs: env::var("GONOTES_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
