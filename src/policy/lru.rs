//! # Least Recently Used (LRU) Store
//!
//! Bounded key-indexed store that keeps its entries in strict recency order.
//! A hit moves the entry to the front; a miss that needs room evicts the single
//! back-most entry, the one touched least recently. It serves both as a
//! standalone policy and as the main (`Am`) tier of
//! [`TwoQueueCache`](crate::policy::two_q::TwoQueueCache).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                           LruStore<K, V>                                 │
//!   │                                                                          │
//!   │   ┌──────────────────────────────────────────────────────────────────┐   │
//!   │   │  HashedQueue<K, V>                                               │   │
//!   │   │                                                                  │   │
//!   │   │   FxHashMap<K, SlotId> ──────┐                                   │   │
//!   │   │                              ▼                                   │   │
//!   │   │   head ──► [page_7] ◄──► [page_2] ◄──► [page_9] ◄── tail         │   │
//!   │   │            MRU                            LRU                    │   │
//!   │   └──────────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fetch Flow
//!
//! ```text
//!   fetch(key, loader)
//!     │
//!     ├── key resident ──► move to MRU ──► true   (loader not called)
//!     │
//!     └── key absent ───► value = loader(&key)
//!                         full? pop LRU
//!                         push (key, value) at MRU ──► false
//! ```
//!
//! ## Operations
//!
//! | Operation   | Time   | Notes                                     |
//! |-------------|--------|-------------------------------------------|
//! | `fetch`     | O(1)*  | *Average; loader cost not included        |
//! | `add`       | O(1)*  | Unconditional admission, may evict        |
//! | `touch`     | O(1)*  | Move to MRU without loading               |
//! | `pop_lru`   | O(1)   | Remove the back entry                     |
//! | `peek`      | O(1)*  | No recency change                         |
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::lru::LruStore;
//!
//! let mut lru = LruStore::new(2);
//! assert!(!lru.fetch(1, |k| k * 100));
//! assert!(!lru.fetch(2, |k| k * 100));
//! assert!(lru.fetch(1, |_| unreachable!()));
//!
//! // 2 is now least recently used and makes room for 3.
//! assert!(!lru.fetch(3, |k| k * 100));
//! assert!(!lru.contains(&2));
//! assert_eq!(lru.peek(&1), Some(&100));
//! ```
//!
//! ## Thread Safety
//!
//! `LruStore` is **not** thread-safe; wrap it in external synchronization if
//! it must be shared.

use std::hash::Hash;

use tracing::trace;

use crate::ds::HashedQueue;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::FetchMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{FetchMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::PageCache;

/// Recency-ordered bounded store.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Clone + Eq + Hash`
/// - `V`: Value type
#[derive(Debug)]
pub struct LruStore<K, V> {
    queue: HashedQueue<K, V>,
    #[cfg(feature = "metrics")]
    metrics: FetchMetrics,
}

impl<K, V> LruStore<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an LRU store holding at most `capacity` entries.
    ///
    /// A capacity of 0 is clamped to 1.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::policy::lru::LruStore;
    ///
    /// let lru: LruStore<u64, String> = LruStore::new(0);
    /// assert_eq!(lru.capacity(), 1);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: HashedQueue::new(capacity),
            #[cfg(feature = "metrics")]
            metrics: FetchMetrics::default(),
        }
    }

    /// Requests `key`, calling `loader` only on a miss.
    ///
    /// Returns `true` on a hit (the entry becomes most recently used) and
    /// `false` on a miss (the loaded value is admitted at the MRU position,
    /// evicting the LRU entry if the store is full).
    pub fn fetch<F>(&mut self, key: K, loader: F) -> bool
    where
        F: FnOnce(&K) -> V,
    {
        PageCache::fetch(self, key, loader)
    }

    /// Fallible form of [`fetch`](Self::fetch).
    ///
    /// A loader error is returned unchanged and leaves the store untouched.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::policy::lru::LruStore;
    ///
    /// let mut lru: LruStore<u32, u32> = LruStore::new(4);
    /// assert_eq!(lru.try_fetch(9, |_| Err("io")), Err("io"));
    /// assert!(lru.is_empty());
    /// ```
    pub fn try_fetch<E, F>(&mut self, key: K, loader: F) -> Result<bool, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if self.queue.move_to_front(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_hit();
            return Ok(true);
        }

        let value = loader(&key)?;
        #[cfg(feature = "metrics")]
        {
            self.metrics.record_miss();
            self.metrics.record_load();
        }
        self.add(key, value);
        Ok(false)
    }

    /// Admits `(key, value)` at the MRU position without calling a loader.
    ///
    /// Evicts and returns the LRU entry if the store was full. If `key` is
    /// already resident its value is replaced and it becomes MRU.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::policy::lru::LruStore;
    ///
    /// let mut lru = LruStore::new(1);
    /// assert_eq!(lru.add("a", 1), None);
    /// assert_eq!(lru.add("b", 2), Some(("a", 1)));
    /// ```
    pub fn add(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(slot) = self.queue.get_mut(&key) {
            *slot = value;
            self.queue.move_to_front(&key);
            return None;
        }

        let evicted = if self.queue.is_full() {
            let evicted = self.queue.pop_back();
            if evicted.is_some() {
                trace!(capacity = self.queue.capacity(), "lru evicted least recently used entry");
                #[cfg(feature = "metrics")]
                self.metrics.record_eviction();
            }
            evicted
        } else {
            None
        };

        self.queue.push_front(key, value);
        evicted
    }

    /// Marks `key` as most recently used; returns `false` if absent.
    pub fn touch(&mut self, key: &K) -> bool {
        self.queue.move_to_front(key)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        self.queue.pop_back()
    }

    /// Returns the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.queue.peek_oldest()
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.queue.erase(key)
    }

    /// Returns the value for `key` without changing recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.queue.get(key)
    }

    /// Returns `true` if `key` is resident.
    pub fn contains(&self, key: &K) -> bool {
        self.queue.contains(key)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.queue.iter()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.queue.debug_validate_invariants();
    }
}

impl<K, V> PageCache<K, V> for LruStore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn try_fetch<E, F>(&mut self, key: K, loader: F) -> Result<bool, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        LruStore::try_fetch(self, key, loader)
    }

    fn contains(&self, key: &K) -> bool {
        self.queue.contains(key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        self.queue.get(key)
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for LruStore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot(self.queue.len(), self.queue.capacity())
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruStore<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.snapshot()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Matches a naive Vec-based LRU model on any request stream.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_reference_model(
            capacity in 1usize..12,
            requests in prop::collection::vec(0u16..24, 0..300)
        ) {
            let mut lru = LruStore::new(capacity);
            let mut model: Vec<u16> = Vec::new(); // MRU first

            for key in requests {
                let expected_hit = model.contains(&key);
                if let Some(pos) = model.iter().position(|&k| k == key) {
                    model.remove(pos);
                } else if model.len() == capacity {
                    model.pop();
                }
                model.insert(0, key);

                prop_assert_eq!(lru.fetch(key, |k| *k), expected_hit);
                prop_assert!(lru.len() <= lru.capacity());
            }

            let order: Vec<u16> = lru.iter().map(|(k, _)| *k).collect();
            prop_assert_eq!(order, model);
            lru.debug_validate_invariants();
        }
    }
}
