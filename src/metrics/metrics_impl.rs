use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::metrics::traits::{FetchMetricsRecorder, IdealMetricsRecorder, TwoQMetricsRecorder};

// ---------------------------------------------------------------------------
// FetchMetrics
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct FetchMetrics {
    pub fetch_calls: u64,
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub evictions: u64,
    pub promotions: u64,
    pub demotions: u64,
    pub bypasses: u64,
}

impl FetchMetrics {
    /// Copies the counters and attaches the given gauges.
    pub fn snapshot(&self, cache_len: usize, capacity: usize) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            fetch_calls: self.fetch_calls,
            hits: self.hits,
            misses: self.misses,
            loads: self.loads,
            evictions: self.evictions,
            promotions: self.promotions,
            demotions: self.demotions,
            bypasses: self.bypasses,
            cache_len,
            capacity,
        }
    }
}

impl FetchMetricsRecorder for FetchMetrics {
    fn record_hit(&mut self) {
        self.fetch_calls += 1;
        self.hits += 1;
    }
    fn record_miss(&mut self) {
        self.fetch_calls += 1;
        self.misses += 1;
    }
    fn record_load(&mut self) {
        self.loads += 1;
    }
    fn record_eviction(&mut self) {
        self.evictions += 1;
    }
    fn record_clear(&mut self) {
        *self = Self::default();
    }
}

impl TwoQMetricsRecorder for FetchMetrics {
    fn record_promotion(&mut self) {
        self.promotions += 1;
    }
    fn record_demotion(&mut self) {
        self.demotions += 1;
    }
}

impl IdealMetricsRecorder for FetchMetrics {
    fn record_bypass(&mut self) {
        self.bypasses += 1;
    }
}
