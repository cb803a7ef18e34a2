//! Configuration module
//!
//! Settings for storage backends, upload limits, the simulated progress
//! indicator and the HTTP client. Values come from `SKETCHIFY_*` environment
//! variables (a `.env` file is loaded first) and fall back to the defaults in
//! [`crate::constants`].

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    ALLOWED_CONTENT_TYPES, COMPLETION_DELAY_MS, MAX_UPLOAD_SIZE_MB, PROGRESS_INTERVAL_MS,
    PROGRESS_STEP,
};
use crate::storage_types::StorageBackend;

const HTTP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_STORAGE_PATH: &str = "./data/hosting";
const DEFAULT_STORAGE_BASE_URL: &str = "http://localhost:8080/hosting";
const DEFAULT_KV_PATH: &str = "./data/kv";

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub storage_path: String,
    pub storage_base_url: String,
    pub kv_path: String,
    // Upload validation
    pub max_upload_size_mb: u64,
    pub allowed_content_types: Vec<String>,
    // Simulated progress
    pub progress_interval_ms: u64,
    pub progress_step: u8,
    pub completion_delay_ms: u64,
    // HTTP client
    pub http_timeout_secs: u64,
    /// Signed-in user; `None` runs the session signed out.
    pub user: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            storage_backend: StorageBackend::Local,
            storage_path: DEFAULT_STORAGE_PATH.to_string(),
            storage_base_url: DEFAULT_STORAGE_BASE_URL.to_string(),
            kv_path: DEFAULT_KV_PATH.to_string(),
            max_upload_size_mb: MAX_UPLOAD_SIZE_MB,
            allowed_content_types: ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            progress_interval_ms: PROGRESS_INTERVAL_MS,
            progress_step: PROGRESS_STEP,
            completion_delay_ms: COMPLETION_DELAY_MS,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            user: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let storage_backend = match lookup("SKETCHIFY_STORAGE_BACKEND") {
            Some(value) => StorageBackend::from_str(&value)?,
            None => defaults.storage_backend,
        };

        let allowed_content_types = lookup("SKETCHIFY_ALLOWED_CONTENT_TYPES")
            .map(|value| {
                value
                    .split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_content_types);

        let config = Config {
            environment: lookup("SKETCHIFY_ENVIRONMENT").unwrap_or(defaults.environment),
            storage_backend,
            storage_path: lookup("SKETCHIFY_STORAGE_PATH").unwrap_or(defaults.storage_path),
            storage_base_url: lookup("SKETCHIFY_STORAGE_BASE_URL")
                .unwrap_or(defaults.storage_base_url),
            kv_path: lookup("SKETCHIFY_KV_PATH").unwrap_or(defaults.kv_path),
            max_upload_size_mb: parse_or("SKETCHIFY_MAX_UPLOAD_SIZE_MB", &lookup, MAX_UPLOAD_SIZE_MB)?,
            allowed_content_types,
            progress_interval_ms: parse_or(
                "SKETCHIFY_PROGRESS_INTERVAL_MS",
                &lookup,
                PROGRESS_INTERVAL_MS,
            )?,
            progress_step: parse_or("SKETCHIFY_PROGRESS_STEP", &lookup, PROGRESS_STEP)?,
            completion_delay_ms: parse_or(
                "SKETCHIFY_COMPLETION_DELAY_MS",
                &lookup,
                COMPLETION_DELAY_MS,
            )?,
            http_timeout_secs: parse_or("SKETCHIFY_HTTP_TIMEOUT_SECS", &lookup, HTTP_TIMEOUT_SECS)?,
            user: lookup("SKETCHIFY_USER").filter(|u| !u.trim().is_empty()),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_size_mb == 0 {
            return Err(anyhow::anyhow!(
                "SKETCHIFY_MAX_UPLOAD_SIZE_MB must be greater than zero"
            ));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "SKETCHIFY_ALLOWED_CONTENT_TYPES must list at least one MIME type"
            ));
        }

        if self.progress_step == 0 || self.progress_step > 100 {
            return Err(anyhow::anyhow!(
                "SKETCHIFY_PROGRESS_STEP must be between 1 and 100"
            ));
        }

        if self.progress_interval_ms == 0 {
            return Err(anyhow::anyhow!(
                "SKETCHIFY_PROGRESS_INTERVAL_MS must be greater than zero"
            ));
        }

        if self.storage_backend == StorageBackend::Local {
            if self.storage_path.trim().is_empty() || self.kv_path.trim().is_empty() {
                return Err(anyhow::anyhow!(
                    "SKETCHIFY_STORAGE_PATH and SKETCHIFY_KV_PATH must be set when using local storage backend"
                ));
            }
            if !self.storage_base_url.starts_with("http://")
                && !self.storage_base_url.starts_with("https://")
            {
                return Err(anyhow::anyhow!(
                    "SKETCHIFY_STORAGE_BASE_URL must be an http(s) URL"
                ));
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
