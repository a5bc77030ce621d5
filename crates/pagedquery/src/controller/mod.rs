//! Reactive controller binding query state to a paged result cache.
//!
//! Handlers only mutate state and apply their invalidation policy; they never
//! fetch. A UI binding calls [`QueryController::load_data`] after a change,
//! the same way a reactive effect would re-run.
//!
//! Invalidation policy per change:
//!
//! | Change | Page reset | Cache effect |
//! |--------|-----------|--------------|
//! | page | - | none |
//! | search term / status filter | yes | none, the key already differs |
//! | items per page | yes | full clear |
//! | sort | - | none |
//! | dependencies | - | entries of the new owner dropped |
//! | `refresh_data` | - | full clear, then fetch |
//! | `clear_cache` | - | full clear, no fetch |

mod view;

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use tokio::sync::watch;

use pagedquery_core::cache::{CacheConfig, CacheKey, CacheKeyFilter, CacheStats};
use pagedquery_core::query::{
    FetchError, FetchResult, PageFetcher, PaginatedResponse, QueryState, SortDirection,
};

use crate::cache::PagedResultCache;

pub use view::{LoadOutcome, QueryView};
use view::Output;

type SharedFetch<T> = Shared<BoxFuture<'static, FetchResult<PaginatedResponse<T>>>>;

/// A fetch started for one key, shared by every load that asks for it.
struct Flight<T> {
    id: u64,
    future: SharedFetch<T>,
}

struct Inner<T> {
    state: QueryState,
    cache: PagedResultCache<T>,
    output: Output<T>,
    /// Id of the most recently started load; only that load may publish.
    latest_request: u64,
    /// Loads that missed the cache and have not finished or been dropped.
    pending_loads: usize,
    in_flight: HashMap<CacheKey, Flight<T>>,
}

impl<T> Inner<T> {
    /// Clears the cache and forgets pending fetches so their results are not stored.
    fn clear_all(&mut self) {
        self.cache.clear();
        self.in_flight.clear();
    }
}

/// Query controller for one dataset.
///
/// Owns its cache; controllers never share one. All methods take `&self`, so
/// a controller can be shared behind an `Arc` by the bindings that drive it.
pub struct QueryController<T, F> {
    fetcher: Arc<F>,
    inner: Mutex<Inner<T>>,
    view_tx: watch::Sender<QueryView<T>>,
}

impl<T, F> QueryController<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: PageFetcher<T> + 'static,
{
    /// Creates a controller with the default cache configuration.
    ///
    /// The first dependency is the owner id that scopes cache keys; the rest
    /// are forwarded to the fetcher unchanged.
    pub fn new(fetcher: Arc<F>, dependencies: Vec<Value>) -> Self {
        Self::with_config(fetcher, dependencies, CacheConfig::default())
    }

    /// Creates a controller with a custom cache configuration.
    pub fn with_config(fetcher: Arc<F>, dependencies: Vec<Value>, config: CacheConfig) -> Self {
        let state = QueryState::default().with_dependencies(dependencies);
        Self::from_state(fetcher, state, config)
    }

    /// Creates a controller starting from an explicit query state.
    pub fn from_state(fetcher: Arc<F>, state: QueryState, config: CacheConfig) -> Self {
        let inner = Inner {
            state,
            cache: PagedResultCache::new(config),
            output: Output::default(),
            latest_request: 0,
            pending_loads: 0,
            in_flight: HashMap::new(),
        };
        let (view_tx, _) = watch::channel(build_view(&inner));

        Self {
            fetcher,
            inner: Mutex::new(inner),
            view_tx,
        }
    }

    /// Loads the page for the current state, from the cache when possible.
    ///
    /// On a miss the fetcher is called, unless the same key is already being
    /// fetched, in which case this load waits for that request instead. The
    /// result is only published if no newer load was started meanwhile.
    pub async fn load_data(&self) -> LoadOutcome {
        let (request_id, key, flight_id, future) = {
            let mut guard = self.lock();
            let inner = &mut *guard;

            inner.latest_request += 1;
            let request_id = inner.latest_request;
            let key = inner.state.cache_key();

            if let Some(entry) = inner.cache.get(&key) {
                inner.output = Output::loaded(
                    entry.items().to_vec(),
                    entry.total_items(),
                    entry.total_pages(),
                );
                self.publish(inner);
                tracing::trace!(
                    key = %key,
                    request_id,
                    hit_rate = inner.cache.stats().hit_rate(),
                    "Serving page from cache"
                );
                return LoadOutcome::CacheHit;
            }

            inner.output.loading = true;
            inner.output.error = None;
            inner.pending_loads += 1;

            let (flight_id, future) = match inner.in_flight.get(&key) {
                Some(flight) => {
                    tracing::debug!(key = %key, request_id, "Joining in-flight fetch");
                    (flight.id, flight.future.clone())
                }
                None => {
                    let params = inner.state.fetch_params();
                    let fetcher = Arc::clone(&self.fetcher);
                    // A panic in the fetcher resolves the flight as an error.
                    let future = AssertUnwindSafe(async move { fetcher.fetch(params).await })
                        .catch_unwind()
                        .map(|result| {
                            result.unwrap_or_else(|_| {
                                Err(FetchError::Other("fetcher panicked".to_string()))
                            })
                        })
                        .boxed()
                        .shared();
                    inner.in_flight.insert(
                        key.clone(),
                        Flight {
                            id: request_id,
                            future: future.clone(),
                        },
                    );
                    tracing::debug!(key = %key, request_id, "Fetching page");
                    (request_id, future)
                }
            };

            self.publish(inner);
            (request_id, key, flight_id, future)
        };

        let _pending = PendingLoad { controller: self };
        let result = future.await;

        let mut guard = self.lock();
        let inner = &mut *guard;

        // The first load to finish a flight stores its result. A flight that
        // was dropped by a clear or invalidation is never stored.
        let owns_flight = inner
            .in_flight
            .get(&key)
            .is_some_and(|flight| flight.id == flight_id);
        if owns_flight {
            inner.in_flight.remove(&key);
            if let Ok(response) = &result {
                inner.cache.set(
                    key.clone(),
                    response.data.clone(),
                    response.pagination.total_items,
                    response.pagination.total_pages,
                );
            }
        }

        if request_id != inner.latest_request {
            tracing::debug!(
                key = %key,
                request_id,
                latest = inner.latest_request,
                "Discarding superseded result"
            );
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                inner.output = Output::loaded(
                    response.data,
                    response.pagination.total_items,
                    response.pagination.total_pages,
                );
                self.publish(inner);
                LoadOutcome::Fetched
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Failed to load page");
                inner.output = Output::failed(err.user_message());
                self.publish(inner);
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Clears the cache and fetches the current page.
    pub async fn refresh_data(&self) -> LoadOutcome {
        {
            let mut inner = self.lock();
            inner.clear_all();
            tracing::debug!("Refreshing data");
        }
        self.load_data().await
    }

    /// Clears the cache without fetching. The next load misses.
    pub fn clear_cache(&self) {
        let mut inner = self.lock();
        inner.clear_all();
    }

    /// Changes the search term and returns to page 1.
    pub fn handle_search(&self, search_term: impl Into<String>) {
        self.update(|inner| {
            inner.state.set_search_term(search_term);
            inner.state.set_page(1);
        });
    }

    /// Changes the status filter and returns to page 1.
    pub fn handle_status_filter(&self, status_filter: impl Into<String>) {
        self.update(|inner| {
            inner.state.set_status_filter(status_filter);
            inner.state.set_page(1);
        });
    }

    /// Changes the page size, returns to page 1, and clears the whole cache.
    ///
    /// Every cached page was cut at the old page size, so none of them can be
    /// reused.
    pub fn handle_items_per_page_change(&self, items_per_page: u32) {
        self.update(|inner| {
            inner.state.set_items_per_page(items_per_page);
            inner.state.set_page(1);
            inner.clear_all();
        });
    }

    /// Moves to another page. Previously visited pages stay cached.
    pub fn handle_page_change(&self, page: u32) {
        self.update(|inner| {
            inner.state.set_page(page);
        });
    }

    /// Sorts by `field`, toggling direction if it is already the sort field.
    pub fn handle_sort(&self, field: impl Into<String>) -> SortDirection {
        let mut direction = SortDirection::Asc;
        self.update(|inner| {
            direction = inner.state.sort_by(field);
        });
        direction
    }

    /// Replaces the dependency list.
    ///
    /// When the list changes, every cached entry of the (new) owner is
    /// dropped so a revisited owner is always refetched. Returns true when the
    /// list changed.
    pub fn set_dependencies(&self, dependencies: Vec<Value>) -> bool {
        let mut changed = false;
        self.update(|inner| {
            changed = inner.state.set_dependencies(dependencies);
            if !changed {
                return;
            }
            let filter = CacheKeyFilter::owner(inner.state.owner_id());
            let removed = inner.cache.invalidate(Some(&filter));
            inner.in_flight.retain(|key, _| !filter.matches(key));
            tracing::debug!(
                owner_id = ?inner.state.owner_id(),
                removed,
                "Dependencies changed, invalidated owner scope"
            );
        });
        changed
    }

    /// Sets the page directly.
    pub fn set_current_page(&self, page: u32) {
        self.update(|inner| {
            inner.state.set_page(page);
        });
    }

    /// Sets the page size directly. Resets to page 1 when it changes but keeps the cache.
    pub fn set_items_per_page(&self, items_per_page: u32) {
        self.update(|inner| {
            inner.state.set_items_per_page(items_per_page);
        });
    }

    /// Sets the search term directly. Resets to page 1 when it changes.
    pub fn set_search_term(&self, search_term: impl Into<String>) {
        self.update(|inner| {
            inner.state.set_search_term(search_term);
        });
    }

    /// Sets the status filter directly. Resets to page 1 when it changes.
    pub fn set_status_filter(&self, status_filter: impl Into<String>) {
        self.update(|inner| {
            inner.state.set_status_filter(status_filter);
        });
    }

    /// Current snapshot of data, status and query state.
    pub fn view(&self) -> QueryView<T> {
        build_view(&self.lock())
    }

    /// Subscribes to view updates. Every state or data change is published.
    pub fn subscribe(&self) -> watch::Receiver<QueryView<T>> {
        self.view_tx.subscribe()
    }

    pub fn data(&self) -> Vec<T> {
        self.lock().output.data.clone()
    }

    pub fn loading(&self) -> bool {
        self.lock().output.loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().output.error.clone()
    }

    pub fn current_page(&self) -> u32 {
        self.lock().state.current_page()
    }

    pub fn items_per_page(&self) -> u32 {
        self.lock().state.items_per_page()
    }

    pub fn total_pages(&self) -> u64 {
        self.lock().output.total_pages
    }

    pub fn total_items(&self) -> u64 {
        self.lock().output.total_items
    }

    pub fn search_term(&self) -> String {
        self.lock().state.search_term().to_string()
    }

    pub fn status_filter(&self) -> String {
        self.lock().state.status_filter().to_string()
    }

    pub fn sort_field(&self) -> String {
        self.lock().state.sort_field().to_string()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.lock().state.sort_direction()
    }

    pub fn owner_id(&self) -> Option<String> {
        self.lock().state.owner_id()
    }

    /// Number of live cache entries. Diagnostics only; sweeps expired entries.
    pub fn cache_size(&self) -> usize {
        self.lock().cache.size()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock().cache.stats()
    }

    fn update(&self, f: impl FnOnce(&mut Inner<T>)) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        f(inner);
        self.publish(inner);
    }

    fn publish(&self, inner: &Inner<T>) {
        self.view_tx.send_replace(build_view(inner));
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // State is plain data and stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn build_view<T: Clone>(inner: &Inner<T>) -> QueryView<T> {
    QueryView {
        data: inner.output.data.clone(),
        loading: inner.output.loading,
        error: inner.output.error.clone(),
        current_page: inner.state.current_page(),
        items_per_page: inner.state.items_per_page(),
        total_pages: inner.output.total_pages,
        total_items: inner.output.total_items,
        search_term: inner.state.search_term().to_string(),
        status_filter: inner.state.status_filter().to_string(),
        sort_field: inner.state.sort_field().to_string(),
        sort_direction: inner.state.sort_direction(),
    }
}

/// Marks a load that missed the cache as pending until it finishes or is dropped.
///
/// When the last pending load goes away without publishing, for instance
/// because the newest one was cancelled, `loading` is cleared so it cannot
/// stay stuck.
struct PendingLoad<'a, T, F>
where
    T: Clone + Send + Sync + 'static,
    F: PageFetcher<T> + 'static,
{
    controller: &'a QueryController<T, F>,
}

impl<T, F> Drop for PendingLoad<'_, T, F>
where
    T: Clone + Send + Sync + 'static,
    F: PageFetcher<T> + 'static,
{
    fn drop(&mut self) {
        let mut guard = self.controller.lock();
        let inner = &mut *guard;
        inner.pending_loads = inner.pending_loads.saturating_sub(1);
        if inner.pending_loads == 0 && inner.output.loading {
            inner.output.loading = false;
            self.controller.publish(inner);
        }
    }
}
