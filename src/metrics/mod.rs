//! Fetch-path counters for cache policies (feature `metrics`).
//!
//! Recording, snapshotting and consumption are split the same way as in the
//! policy code: caches own a [`FetchMetrics`](metrics_impl::FetchMetrics)
//! recorder and hand out plain [`CacheMetricsSnapshot`](snapshot::CacheMetricsSnapshot)
//! values through [`MetricsSnapshotProvider`](traits::MetricsSnapshotProvider).

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
