//! Paged result cache with lazy TTL expiry and FIFO eviction.
//!
//! Entries are kept in creation order. Reads never reorder them, so when the
//! cache is full the entry created longest ago is evicted first, regardless of
//! how recently it was read. Overwriting a key gives it a fresh creation time
//! and moves it to the newest position.
//!
//! Expired entries are swept on every read, write and size query; there is no
//! background timer.

use lru::LruCache;
use tokio::time::{Duration, Instant};

use pagedquery_core::cache::{CacheConfig, CacheKey, CacheKeyFilter, CacheStats};

/// One cached page of results.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    items: Vec<T>,
    created_at: Instant,
    total_items: u64,
    total_pages: u64,
}

impl<T> CacheEntry<T> {
    fn new(items: Vec<T>, total_items: u64, total_pages: u64) -> Self {
        Self {
            items,
            created_at: Instant::now(),
            total_items,
            total_pages,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Returns true if this entry is older than `max_age` at `now`.
    ///
    /// A clock reading earlier than the creation time counts as age zero.
    fn is_expired(&self, now: Instant, max_age: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > max_age
    }
}

/// Bounded, time-expiring cache of query pages keyed by [`CacheKey`].
#[derive(Debug)]
pub struct PagedResultCache<T> {
    /// Entries ordered oldest to newest by creation time.
    store: LruCache<CacheKey, CacheEntry<T>>,
    config: CacheConfig,
    stats: CacheStats,
}

impl<T> PagedResultCache<T> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: LruCache::unbounded(),
            config,
            stats: CacheStats::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Looks up the page stored under `key`.
    ///
    /// Sweeps every expired entry first.
    pub fn get(&mut self, key: &CacheKey) -> Option<&CacheEntry<T>> {
        self.purge_expired();

        let now = Instant::now();
        let expired = match self.store.peek(key) {
            Some(entry) => entry.is_expired(now, self.config.max_age()),
            None => {
                self.stats.misses += 1;
                tracing::trace!(key = %key, "Cache miss");
                return None;
            }
        };

        if expired {
            self.store.pop(key);
            self.stats.expirations += 1;
            self.stats.misses += 1;
            tracing::trace!(key = %key, "Cache entry expired on read");
            return None;
        }

        self.stats.hits += 1;
        tracing::trace!(key = %key, "Cache hit");
        self.store.peek(key)
    }

    /// Stores a page under `key`, replacing any previous entry.
    ///
    /// Sweeps expired entries, then evicts the oldest entries if a new key
    /// would exceed the configured capacity.
    pub fn set(&mut self, key: CacheKey, items: Vec<T>, total_items: u64, total_pages: u64) {
        self.purge_expired();

        if !self.store.contains(&key) {
            while self.store.len() >= self.config.max_entries() {
                let Some((evicted, _)) = self.store.pop_lru() else {
                    break;
                };
                self.stats.evictions += 1;
                tracing::debug!(key = %evicted, "Evicted oldest cache entry");
            }
        }

        tracing::trace!(key = %key, count = items.len(), "Caching page");
        self.store
            .put(key, CacheEntry::new(items, total_items, total_pages));
    }

    /// Removes entries matching `filter`, or every entry when `filter` is
    /// `None` or constrains no field.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, filter: Option<&CacheKeyFilter>) -> usize {
        let Some(filter) = filter.filter(|filter| !filter.is_wildcard()) else {
            let removed = self.store.len();
            self.clear();
            return removed;
        };

        let matching: Vec<CacheKey> = self
            .store
            .iter()
            .filter(|(key, _)| filter.matches(key))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &matching {
            self.store.pop(key);
        }

        self.stats.invalidations += matching.len() as u64;
        tracing::debug!(?filter, removed = matching.len(), "Invalidated cache entries");
        matching.len()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        let removed = self.store.len();
        self.store.clear();
        self.stats.invalidations += removed as u64;
        tracing::debug!(removed, "Cleared cache");
    }

    /// Number of live entries.
    ///
    /// Sweeps expired entries before counting, so this is not a pure read.
    pub fn size(&mut self) -> usize {
        self.purge_expired();
        self.store.len()
    }

    /// Drops every entry older than the configured max age.
    fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let max_age = self.config.max_age();

        let expired: Vec<CacheKey> = self
            .store
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, max_age))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.store.pop(key);
        }

        if !expired.is_empty() {
            self.stats.expirations += expired.len() as u64;
            tracing::debug!(removed = expired.len(), "Purged expired cache entries");
        }
        expired.len()
    }
}

impl<T> Default for PagedResultCache<T> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
