//! Panchang derivation engine behind the `panchang-api` service.
//!
//! Given a date and a location the pipeline produces a best-effort Vedic
//! calendar day description: it prefers data scraped from an external
//! authority site and fills every gap from a deterministic approximation
//! calculator, so a caller always gets a complete record. Modules, leaf
//! first:
//!
//! - [`timeutil`] — `HH:MM` clock-string arithmetic
//! - [`tables`] — fixed tithi/nakshatra/yoga/karana/rashi enumerations
//! - [`extract`] — HTML/JS scraper for the authority site
//! - [`fallback`] — total, deterministic approximation calculator
//! - [`sources`] — geocoding and sunrise/sunset collaborators
//! - [`assemble`] — the merge orchestrator
//! - [`cache`] — bounded TTL record cache
//! - [`routes`] — axum route gateway (`/panchang`, `/health`)

use std::time::Duration;

use anyhow::Result;

pub mod assemble;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod models;
pub mod routes;
pub mod sources;
pub mod tables;
pub mod timeutil;

pub use config::Config;

// ---

/// Shared state handed to every route: immutable config, one HTTP client
/// reused across outbound calls, and the process-local record cache.
pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
    pub cache: cache::RecordCache,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        // ---
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs as u64))
            .user_agent(concat!("panchang-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = cache::RecordCache::new(
            config.cache_capacity as usize,
            Duration::from_secs(config.cache_ttl_secs as u64),
        );

        Ok(AppState {
            config,
            http,
            cache,
        })
    }
}
