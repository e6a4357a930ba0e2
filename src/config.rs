use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::cache::{
    CACHE_DIR_ENV, DEFAULT_CACHE_DIR, DOWNLOAD_TIMEOUT_ENV, PROGRESS_INTERVAL_SECS,
};
use crate::constants::datasets::{BASE_URL_ENV, DEFAULT_BASE_URL};
use crate::errors::DatasetError;

/// Settings for a [`ContentCache`](crate::cache::ContentCache).
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Base directory under which every fetched or extracted artifact is stored.
    pub root: PathBuf,
    /// Upper bound for a whole HTTP exchange. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Minimum delay between two download progress log lines.
    pub progress_interval: Duration,
}

impl CacheConfig {
    /// Create a config rooted at `root` with no download timeout.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            timeout: None,
            progress_interval: Duration::from_secs(PROGRESS_INTERVAL_SECS),
        }
    }

    /// Resolve the cache root and timeout from the environment.
    ///
    /// `RECDATA_CACHE_DIR` wins over `$HOME/.recdata`, which wins over `./.recdata`.
    pub fn from_env() -> Result<Self, DatasetError> {
        let root = match env::var_os(CACHE_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => env::var_os("HOME")
                .filter(|home| !home.is_empty())
                .map(|home| PathBuf::from(home).join(DEFAULT_CACHE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
        };
        let mut config = Self::new(root);
        if let Ok(raw) = env::var(DOWNLOAD_TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|err| {
                DatasetError::Configuration(format!(
                    "{DOWNLOAD_TIMEOUT_ENV} must be a whole number of seconds, got '{raw}': {err}"
                ))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Bound every HTTP exchange by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Configure how often download progress is logged.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}

/// Settings for the built-in [`DatasetRegistry`](crate::datasets::DatasetRegistry).
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// URL prefix under which every dataset archive lives, without trailing slash.
    pub base_url: String,
}

impl RegistryConfig {
    /// Create a config fetching archives from `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolve the base URL from `RECDATA_DATASET_BASE_URL`, else the public mirror.
    pub fn from_env() -> Self {
        match env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
