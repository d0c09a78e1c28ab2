use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_JOBS_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
/// Every value has a default; only malformed values are errors.
#[derive(Debug, Clone)]
pub struct Config {
    /// Primary application backend (auth, resumes, applications, AI).
    pub api_url: String,
    /// Job-listings backend, consulted without session recovery.
    pub jobs_api_url: String,
    pub request_timeout: Duration,
    pub credentials_path: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs = match lookup("JOBDECK_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .context("JOBDECK_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let credentials_path = match lookup("JOBDECK_CREDENTIALS_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_credentials_path()?,
        };

        Ok(Config {
            api_url: base_url(lookup("JOBDECK_API_URL"), DEFAULT_API_URL),
            jobs_api_url: base_url(lookup("JOBDECK_JOBS_API_URL"), DEFAULT_JOBS_API_URL),
            request_timeout: Duration::from_secs(timeout_secs),
            credentials_path,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn base_url(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
        .trim()
        .trim_end_matches('/')
        .to_string()
}

fn default_credentials_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("dev", "jobdeck", "jobdeck")
        .context("Could not determine a config directory; set JOBDECK_CREDENTIALS_PATH")?;
    Ok(dirs.config_dir().join("credentials.json"))
}
