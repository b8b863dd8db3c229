use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://youtubevideodownloader-gcqv.onrender.com/download-and-trim";
/// The service downloads and transcodes before answering, so this is generous.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub const ENV_ENDPOINT: &str = "CLIPDECK_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "CLIPDECK_TIMEOUT_SECS";
pub const ENV_DOWNLOAD_DIR: &str = "CLIPDECK_DOWNLOAD_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { key: &'static str, value: String },
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipdeckConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub download_dir: PathBuf,
}

impl Default for ClipdeckConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            download_dir: PathBuf::from("."),
        }
    }
}

impl ClipdeckConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for the `CLIPDECK_*` keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            let endpoint = endpoint.trim();
            if endpoint.is_empty() {
                return Err(ConfigError::Empty { key: ENV_ENDPOINT });
            }
            config.endpoint = endpoint.to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout = parse_timeout(ENV_TIMEOUT_SECS, &raw)?;
        }

        if let Some(dir) = lookup(ENV_DOWNLOAD_DIR) {
            if dir.trim().is_empty() {
                return Err(ConfigError::Empty { key: ENV_DOWNLOAD_DIR });
            }
            config.download_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

fn parse_timeout(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout { key, value: raw.to_string() }),
    }
}
