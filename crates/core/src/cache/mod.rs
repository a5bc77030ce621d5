mod config;
mod error;
mod filter;
mod keys;
mod stats;

pub use config::{CacheConfig, DEFAULT_MAX_AGE, DEFAULT_MAX_ENTRIES};
pub use error::{ConfigError, Result};
pub use filter::CacheKeyFilter;
pub use keys::{normalize_status_filter, CacheKey, ALL_STATUSES, DEFAULT_ITEMS_PER_PAGE};
pub use stats::CacheStats;
