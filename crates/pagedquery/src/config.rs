use std::{env, time::Duration};

use pagedquery_core::cache::{self, CacheConfig, DEFAULT_MAX_AGE, DEFAULT_MAX_ENTRIES};

/// Cache configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Entry lifetime in seconds (default: 300)
    pub cache_max_age_seconds: u64,
    /// Maximum number of cached pages (default: 50)
    pub cache_max_entries: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PAGED_CACHE_MAX_AGE_SECONDS` - Entry lifetime in seconds (default: 300)
    /// - `PAGED_CACHE_MAX_ENTRIES` - Maximum cached pages (default: 50)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            cache_max_age_seconds: lookup("PAGED_CACHE_MAX_AGE_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_AGE.as_secs()),
            cache_max_entries: lookup("PAGED_CACHE_MAX_ENTRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_ENTRIES),
        }
    }

    /// Get the entry lifetime as a Duration.
    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_seconds)
    }

    /// Validates the values into a [`CacheConfig`].
    pub fn cache_config(&self) -> cache::Result<CacheConfig> {
        CacheConfig::new(self.cache_max_age(), self.cache_max_entries)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
