//! Imperative shell for paginated queries.
//!
//! [`PagedResultCache`] stores fetched pages with a TTL and a capacity bound;
//! [`QueryController`] binds query state to that cache and a [`PageFetcher`],
//! publishing a [`QueryView`] after every change.

pub mod cache;
pub mod config;
pub mod controller;

pub use cache::{CacheEntry, PagedResultCache};
pub use config::Config;
pub use controller::{LoadOutcome, QueryController, QueryView};

pub use pagedquery_core::cache::{CacheConfig, CacheKey, CacheKeyFilter, CacheStats};
pub use pagedquery_core::query::{
    fetch_fn, FetchError, FetchParams, FetchResult, PageFetcher, PaginatedResponse, QueryState,
    SortDirection,
};
