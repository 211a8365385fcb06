//! Ideal (Belady / OPT) offline replacement policy.
//!
//! Knows the whole future reference trace up front and, when room is needed,
//! evicts the resident whose next request lies farthest in the future. A key
//! that will never be requested again is not admitted at all, so the loader
//! is not called for it. The resulting hit count is the best any
//! demand-paging policy can achieve for the same capacity, which makes this
//! cache the yardstick the online policies are measured against.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                         IdealCache<K, V> Layout                          │
//! │                                                                          │
//! │   trace: ReferenceTrace<K>                                               │
//! │   ┌────┬────┬────┬────┬────┬────┬────┬────┐                              │
//! │   │ 1  │ 2  │ 3  │ 1  │ 2  │ 5  │ 1  │ 4  │                              │
//! │   └────┴────┴────┴────┴────┴────┴────┴────┘                              │
//! │                     ▲                                                    │
//! │                  cursor (next request position)                          │
//! │                                                                          │
//! │   resident: HashedQueue<K, V>   newest admitted ──► oldest admitted      │
//! │   ┌──────────┬──────────┬──────────┐                                     │
//! │   │ 3        │ 2        │ 1        │   victim = max next_use(k, pos + 1) │
//! │   └──────────┴──────────┴──────────┘   (None beats everything)           │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fetch Flow
//!
//! ```text
//!   pos = cursor
//!   resident(key)                    ──► cursor += 1, hit
//!   next_use(key, pos + 1) is None   ──► cursor += 1, bypass (miss)
//!   value = loader(&key)?            (error: nothing changes)
//!   cursor += 1
//!   if full: evict farthest-next-use resident
//!   admit (key, value)               ──► miss
//! ```
//!
//! Victims are scanned newest-admitted first; a resident with no future
//! reference is taken immediately, otherwise the first maximum wins.
//!
//! Requests are expected to follow the trace. A request for a different key
//! than the trace names at the cursor is still served, but logged at `warn`
//! level since the eviction decisions are then no longer optimal.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::ideal::IdealCache;
//!
//! let trace = vec![1, 2, 3, 4, 1, 2, 5, 1, 2, 4, 3, 4];
//! let mut cache = IdealCache::new(4, trace.clone());
//! let hits = trace
//!     .into_iter()
//!     .filter(|&key| cache.fetch(key, |k| *k))
//!     .count();
//! assert_eq!(hits, 7);
//! assert_eq!(cache.remaining(), 0);
//! ```
//!
//! ## Thread Safety
//!
//! - [`IdealCache`]: Not thread-safe, designed for single-threaded use
//!
//! ## References
//!
//! - L. A. Belady, "A study of replacement algorithms for a virtual-storage
//!   computer", IBM Systems Journal, 1966

use std::hash::Hash;

use tracing::{debug, trace, warn};

use crate::ds::{HashedQueue, ReferenceTrace};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::FetchMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{FetchMetricsRecorder, IdealMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::PageCache;

/// Belady-optimal cache over a known reference trace.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Clone + Eq + Hash`
/// - `V`: Value type
#[derive(Debug)]
pub struct IdealCache<K, V> {
    resident: HashedQueue<K, V>,
    trace: ReferenceTrace<K>,
    cursor: usize,
    #[cfg(feature = "metrics")]
    metrics: FetchMetrics,
}

impl<K, V> IdealCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an ideal cache for `trace`, holding at most `capacity` entries.
    ///
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize, trace: Vec<K>) -> Self {
        let trace = ReferenceTrace::new(trace);
        debug!(
            capacity = capacity.max(1),
            trace_len = trace.len(),
            distinct_keys = trace.distinct_keys(),
            "created ideal cache"
        );
        Self {
            resident: HashedQueue::new(capacity),
            trace,
            cursor: 0,
            #[cfg(feature = "metrics")]
            metrics: FetchMetrics::default(),
        }
    }

    /// Issues the next request of the trace.
    ///
    /// Returns `true` on a hit. Keys with no later reference are not admitted
    /// and `loader` is not called for them.
    pub fn fetch<F>(&mut self, key: K, loader: F) -> bool
    where
        F: FnOnce(&K) -> V,
    {
        PageCache::fetch(self, key, loader)
    }

    /// Fallible form of [`fetch`](Self::fetch).
    ///
    /// On a loader error neither the cursor nor the resident set changes, so
    /// the same request can be issued again.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::policy::ideal::IdealCache;
    ///
    /// let mut cache: IdealCache<u32, u32> = IdealCache::new(2, vec![1, 1]);
    /// assert_eq!(cache.try_fetch(1, |_| Err("offline")), Err("offline"));
    /// assert_eq!(cache.cursor(), 0);
    ///
    /// assert_eq!(cache.try_fetch(1, |k| Ok::<_, &str>(*k)), Ok(false));
    /// assert_eq!(cache.try_fetch(1, |_| Err("unused")), Ok(true));
    /// ```
    pub fn try_fetch<E, F>(&mut self, key: K, loader: F) -> Result<bool, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        let pos = self.cursor;
        if let Some(expected) = self.trace.get(pos) {
            if *expected != key {
                warn!(position = pos, "request diverges from the reference trace");
            }
        }

        if self.resident.contains(&key) {
            self.cursor += 1;
            #[cfg(feature = "metrics")]
            self.metrics.record_hit();
            return Ok(true);
        }

        if self.trace.next_use(&key, pos + 1).is_none() {
            self.cursor += 1;
            trace!(position = pos, "ideal bypassed key with no future reference");
            #[cfg(feature = "metrics")]
            {
                self.metrics.record_miss();
                self.metrics.record_bypass();
            }
            return Ok(false);
        }

        let value = loader(&key)?;
        self.cursor += 1;
        #[cfg(feature = "metrics")]
        {
            self.metrics.record_miss();
            self.metrics.record_load();
        }

        if self.resident.is_full() {
            self.evict_farthest(pos + 1);
        }
        self.resident.push_front(key, value);
        Ok(false)
    }

    /// Evicts the resident whose next reference at or after `from` is farthest away.
    fn evict_farthest(&mut self, from: usize) {
        let mut victim: Option<(&K, usize)> = None;
        let mut never_again: Option<&K> = None;

        for (key, _) in self.resident.iter() {
            match self.trace.next_use(key, from) {
                None => {
                    never_again = Some(key);
                    break;
                },
                Some(next) => {
                    if victim.is_none_or(|(_, best)| next > best) {
                        victim = Some((key, next));
                    }
                },
            }
        }

        let Some(victim) = never_again.or(victim.map(|(key, _)| key)).cloned() else {
            return;
        };
        let erased = self.resident.erase(&victim);
        debug_assert!(erased.is_some(), "victim vanished from the resident set");
        trace!(
            position = from - 1,
            resident = self.resident.len(),
            "ideal evicted farthest-next-use entry"
        );
        #[cfg(feature = "metrics")]
        self.metrics.record_eviction();
    }

    /// Position of the next request to be issued.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of trace requests not yet issued.
    pub fn remaining(&self) -> usize {
        self.trace.len().saturating_sub(self.cursor)
    }

    /// The full reference trace.
    pub fn trace(&self) -> &[K] {
        self.trace.as_slice()
    }

    /// Position at or after the cursor where `key` is requested next.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::policy::ideal::IdealCache;
    ///
    /// let mut cache: IdealCache<char, ()> = IdealCache::new(1, vec!['a', 'b', 'a']);
    /// assert_eq!(cache.next_use(&'a'), Some(0));
    /// cache.fetch('a', |_| ());
    /// assert_eq!(cache.next_use(&'a'), Some(2));
    /// assert_eq!(cache.next_use(&'z'), None);
    /// ```
    pub fn next_use(&self, key: &K) -> Option<usize> {
        self.trace.next_use(key, self.cursor)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.resident.contains(key)
    }

    /// Returns the resident value for `key`.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.resident.get(key)
    }

    pub fn len(&self) -> usize {
        self.resident.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resident.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.resident.capacity()
    }

    /// Rewinds to the start of the trace and drops every resident.
    pub fn reset(&mut self) {
        self.resident.clear();
        self.cursor = 0;
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.resident.debug_validate_invariants();
        assert!(self.resident.len() <= self.resident.capacity());
    }
}

impl<K, V> PageCache<K, V> for IdealCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn try_fetch<E, F>(&mut self, key: K, loader: F) -> Result<bool, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        IdealCache::try_fetch(self, key, loader)
    }

    fn contains(&self, key: &K) -> bool {
        self.resident.contains(key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        self.resident.get(key)
    }

    fn len(&self) -> usize {
        self.resident.len()
    }

    fn capacity(&self) -> usize {
        self.resident.capacity()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for IdealCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot(self.len(), self.capacity())
    }
}

#[cfg(feature = "metrics")]
impl<K, V> IdealCache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.snapshot()
    }
}
