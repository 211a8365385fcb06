/// Point-in-time copy of a cache's fetch counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub fetch_calls: u64,
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub evictions: u64,

    // policy-specific, zero where not applicable
    pub promotions: u64,
    pub demotions: u64,
    pub bypasses: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl CacheMetricsSnapshot {
    /// Fraction of fetches that hit, or `0.0` before the first fetch.
    pub fn hit_ratio(&self) -> f64 {
        if self.fetch_calls == 0 {
            0.0
        } else {
            self.hits as f64 / self.fetch_calls as f64
        }
    }
}
