//! # Metrics Trait Hierarchy
//!
//! Recording is separated from snapshotting so policy code only ever writes
//! counters, and tests or drivers only ever read them.
//!
//! ```text
//!                  ┌─────────────────────────────┐
//!                  │    FetchMetricsRecorder     │
//!                  │  hit / miss / load / evict  │
//!                  └──────────────┬──────────────┘
//!                                 │
//!                 ┌───────────────┴───────────────┐
//!                 ▼                               ▼
//!      ┌─────────────────────┐         ┌─────────────────────┐
//!      │ TwoQMetricsRecorder │         │ IdealMetricsRecorder│
//!      │ promotion/demotion  │         │ bypass              │
//!      └─────────────────────┘         └─────────────────────┘
//!
//!   Consumption:  MetricsSnapshotProvider<S>  (driver / test)
//! ```

/// Counters shared by every policy.
pub trait FetchMetricsRecorder {
    fn record_hit(&mut self);
    fn record_miss(&mut self);
    /// The loader produced a value.
    fn record_load(&mut self);
    /// An entry left the cache entirely.
    fn record_eviction(&mut self);
    fn record_clear(&mut self);
}

/// 2Q tier movements.
pub trait TwoQMetricsRecorder: FetchMetricsRecorder {
    /// `Aout` -> `Am` on a second reference.
    fn record_promotion(&mut self);
    /// `Ain` -> `Aout` when the admission queue overflows.
    fn record_demotion(&mut self);
}

/// Offline-policy decisions.
pub trait IdealMetricsRecorder: FetchMetricsRecorder {
    /// A miss for a key with no future reference was not admitted.
    fn record_bypass(&mut self);
}

/// Read a point-in-time snapshot of a cache's metrics.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
