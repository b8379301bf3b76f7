//! Configuration loader for the `panchang-api` backend service.
//!
//! This module centralizes all runtime configuration values and their
//! defaults, loading from environment variables (with optional `.env` file
//! support provided by the caller). Consolidating the `env::var` calls here
//! keeps the fetch/cache knobs in one auditable place.

use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Parse an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Panchang authority site base URL (scrape target).
    pub source_url: String,

    /// Reverse-geocoding service base URL.
    pub geocode_api_url: String,

    /// Sunrise/sunset service base URL.
    pub suntime_api_url: String,

    /// Per-attempt timeout for outbound fetches, in seconds.
    pub fetch_timeout_secs: u32,

    /// Retries after the first failed fetch attempt.
    pub fetch_retries: u32,

    /// Assembled-record cache time-to-live, in seconds.
    pub cache_ttl_secs: u32,

    /// Maximum number of cached records before oldest-entry eviction.
    pub cache_capacity: u32,

    /// City used when a request names no location.
    pub default_city: String,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `PANCHANG_SOURCE_URL` – Panchang authority site base URL
///
/// Optional:
/// - `GEOCODE_API_URL` – reverse-geocoding base URL
/// - `SUNTIME_API_URL` – sunrise/sunset service base URL
/// - `FETCH_TIMEOUT_SECS` – per-attempt fetch timeout (default: 20)
/// - `FETCH_RETRIES` – retries after the first attempt (default: 2)
/// - `CACHE_TTL_SECS` – record cache TTL (default: 1800)
/// - `CACHE_CAPACITY` – record cache size cap (default: 256)
/// - `DEFAULT_CITY` – fallback city (default: "New Delhi")
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let source_url = require_env!("PANCHANG_SOURCE_URL");
    let geocode_api_url = env_or!(
        "GEOCODE_API_URL",
        "https://api.bigdatacloud.net/data/reverse-geocode-client"
    );
    let suntime_api_url = env_or!("SUNTIME_API_URL", "https://api.sunrise-sunset.org/json");
    let fetch_timeout_secs = parse_env_u32!("FETCH_TIMEOUT_SECS", 20);
    let fetch_retries = parse_env_u32!("FETCH_RETRIES", 2);
    let cache_ttl_secs = parse_env_u32!("CACHE_TTL_SECS", 1800);
    let cache_capacity = parse_env_u32!("CACHE_CAPACITY", 256);
    let default_city = env_or!("DEFAULT_CITY", "New Delhi");

    Ok(Config {
        source_url,
        geocode_api_url,
        suntime_api_url,
        fetch_timeout_secs,
        fetch_retries,
        cache_ttl_secs,
        cache_capacity,
        default_city,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  PANCHANG_SOURCE_URL : {}", self.source_url);
        tracing::info!("  GEOCODE_API_URL     : {}", self.geocode_api_url);
        tracing::info!("  SUNTIME_API_URL     : {}", self.suntime_api_url);
        tracing::info!("  FETCH_TIMEOUT_SECS  : {}", self.fetch_timeout_secs);
        tracing::info!("  FETCH_RETRIES       : {}", self.fetch_retries);
        tracing::info!("  CACHE_TTL_SECS      : {}", self.cache_ttl_secs);
        tracing::info!("  CACHE_CAPACITY      : {}", self.cache_capacity);
        tracing::info!("  DEFAULT_CITY        : {}", self.default_city);
    }
}
