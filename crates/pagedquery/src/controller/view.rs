use pagedquery_core::query::{FetchError, SortDirection};

/// Snapshot of everything a UI binding renders from a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryView<T> {
    pub data: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub current_page: u32,
    pub items_per_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub search_term: String,
    pub status_filter: String,
    pub sort_field: String,
    pub sort_direction: SortDirection,
}

/// How a call to `load_data` was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Served from the cache without calling the fetcher.
    CacheHit,
    /// Fetched and published.
    Fetched,
    /// The fetcher failed; the error was published.
    Failed(FetchError),
    /// A newer load started before this one finished, so its result was not published.
    Superseded,
}

impl LoadOutcome {
    pub fn is_cache_hit(&self) -> bool {
        matches!(self, LoadOutcome::CacheHit)
    }
}

/// Result fields owned by the controller, as opposed to query state.
#[derive(Debug, Clone)]
pub(crate) struct Output<T> {
    pub data: Vec<T>,
    pub total_items: u64,
    pub total_pages: u64,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for Output<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total_items: 0,
            total_pages: 0,
            loading: false,
            error: None,
        }
    }
}

impl<T> Output<T> {
    pub fn loaded(data: Vec<T>, total_items: u64, total_pages: u64) -> Self {
        Self {
            data,
            total_items,
            total_pages,
            loading: false,
            error: None,
        }
    }

    pub fn failed(message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::default()
        }
    }
}
