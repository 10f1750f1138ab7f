use std::env;

use crate::nyt::DEFAULT_BASE_URL;

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub cors_origins: Vec<String>,
    /// Upstream credential. Absence is surfaced on the first refresh
    /// attempt, not at startup.
    pub nyt_api_key: Option<String>,
    pub nyt_base_url: String,
    pub freshness_hours: i64,
    pub upstream_timeout_secs: u64,
    /// Optional warm-refresh interval. Disabled when unset.
    pub background_refresh_hours: Option<u64>,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3002);

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/bestsellers".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            });

        let nyt_api_key = env::var("NYT_API_KEY").ok().filter(|k| !k.is_empty());

        let nyt_base_url =
            env::var("NYT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let freshness_hours = env::var("CACHE_FRESHNESS_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24);

        let upstream_timeout_secs = env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15);

        let background_refresh_hours = env::var("BACKGROUND_REFRESH_HOURS")
            .ok()
            .and_then(|v| v.parse().ok());

        Self {
            port,
            database_url,
            cors_origins,
            nyt_api_key,
            nyt_base_url,
            freshness_hours,
            upstream_timeout_secs,
            background_refresh_hours,
        }
    }
}
