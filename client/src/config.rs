//! Configuration management for the booking client.
//!
//! Loads configuration from environment variables with sensible defaults.

use concert_booking_auth::{DEFAULT_TOKEN_KEY, FileStore, InMemoryStore, KeyValueStore, TokenStore};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Default reservation polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, endpoint paths are appended to it
    pub api_base_url: String,
    /// Per-request timeout (`None` = no client-side timeout)
    pub request_timeout: Option<Duration>,
    /// How often a pending reservation is re-read
    pub poll_interval: Duration,
    /// Token file (`None` = tokens live in memory only)
    pub token_file: Option<PathBuf>,
    /// Storage key for the token pair
    pub token_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            token_file: None,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `BOOKING_API_BASE_URL` | `http://localhost:8080/api` |
    /// | `BOOKING_REQUEST_TIMEOUT_SECS` | unset (no timeout) |
    /// | `BOOKING_POLL_INTERVAL_SECS` | `60` |
    /// | `BOOKING_TOKEN_FILE` | unset (in-memory) |
    /// | `BOOKING_TOKEN_KEY` | `concert_hub_tokens` |
    ///
    /// Unparseable numbers fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = |key: &str| {
            non_empty(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|&n| n > 0)
                .map(Duration::from_secs)
        };

        Self {
            api_base_url: non_empty("BOOKING_API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout: secs("BOOKING_REQUEST_TIMEOUT_SECS"),
            poll_interval: secs("BOOKING_POLL_INTERVAL_SECS").unwrap_or(defaults.poll_interval),
            token_file: non_empty("BOOKING_TOKEN_FILE").map(PathBuf::from),
            token_key: non_empty("BOOKING_TOKEN_KEY").unwrap_or(defaults.token_key),
        }
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the request timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Persist tokens to `path`
    #[must_use]
    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Override the token storage key
    #[must_use]
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Build the token store this configuration describes.
    #[must_use]
    pub fn token_store(&self) -> TokenStore {
        let store: Arc<dyn KeyValueStore> = match &self.token_file {
            Some(path) => Arc::new(FileStore::new(path)),
            None => Arc::new(InMemoryStore::new()),
        };
        TokenStore::with_key(store, self.token_key.clone())
    }
}
