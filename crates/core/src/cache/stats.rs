/// Counters describing how a cache has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries removed to stay within capacity.
    pub evictions: u64,
    /// Entries removed because they outlived the max age.
    pub expirations: u64,
    /// Entries removed by invalidation or clearing.
    pub invalidations: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, 0.0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }

    /// Total number of lookups.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}
