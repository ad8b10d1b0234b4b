use anyhow::{Context, Result};
use tracing::warn;

/// Application configuration loaded from environment variables.
///
/// Only `PORT` is validated. A missing generation credential is tolerated so the
/// service can start; generation calls then fail at call time.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_key: optional_env("API_KEY").or_else(|| optional_env("GEMINI_API_KEY")),
            redis_url: optional_env("REDIS_URL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Logs a warning for every optional setting that is absent.
    /// Called after the subscriber is installed so the warnings are visible.
    pub fn warn_missing(&self) {
        if self.api_key.is_none() {
            warn!("API_KEY is not set in environment variables; generation calls will fail");
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
