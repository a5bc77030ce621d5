//! Validated cache configuration.

use std::time::Duration;

use super::{ConfigError, Result};

/// Default time an entry stays valid (5 minutes).
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(300);

/// Default number of entries kept before FIFO eviction.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Time and capacity budget for a paged result cache.
///
/// Immutable once built; use [`CacheConfig::new`] to validate custom values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    max_age: Duration,
    max_entries: usize,
}

impl CacheConfig {
    /// Create and validate a cache config.
    pub fn new(max_age: Duration, max_entries: usize) -> Result<Self> {
        if max_entries == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if max_age.is_zero() {
            return Err(ConfigError::ZeroMaxAge);
        }

        Ok(Self {
            max_age,
            max_entries,
        })
    }

    /// Age after which an entry is discarded on next access.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Maximum number of entries held at once.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}
