use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CACHE_DURATION;
use crate::store::DB_FILE_NAME;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub language: String,
    /// `None` leaves requests unbounded.
    pub api_timeout: Option<Duration>,
    pub cache_ttl: Duration,
    pub database_path: PathBuf,
}

impl Config {
    pub fn new(api_key: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: api_base_url.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            api_timeout: None,
            cache_ttl: CACHE_DURATION,
            database_path: PathBuf::from(DB_FILE_NAME),
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_timeout = match env::var("API_TIMEOUT_SECONDS") {
            Ok(raw) => Some(Duration::from_secs(
                raw.parse().context("Invalid API_TIMEOUT_SECONDS")?,
            )),
            Err(_) => None,
        };

        let cache_ttl = match env::var("CACHE_TTL_SECONDS") {
            Ok(raw) => Duration::from_secs(raw.parse().context("Invalid CACHE_TTL_SECONDS")?),
            Err(_) => CACHE_DURATION,
        };

        Ok(Config {
            api_key: env::var("TMDB_API_KEY").unwrap_or_default(),

            api_base_url: env::var("TMDB_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),

            language: env::var("TMDB_LANGUAGE")
                .unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string()),

            api_timeout,
            cache_ttl,

            database_path: env::var("FAVORITES_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DB_FILE_NAME)),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.api_timeout = Some(timeout);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }
}
