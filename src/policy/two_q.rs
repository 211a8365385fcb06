//! Two-Queue (2Q) cache replacement policy.
//!
//! Keeps first-time references out of the main store: a new key lands in a
//! short FIFO (`Ain`); when `Ain` overflows its oldest entry is demoted, value
//! included, into a second FIFO (`Aout`). Only a key that is requested again
//! while remembered in `Aout` earns a place in the recency-tracked main store
//! (`Am`). A single sequential scan therefore flows through `Ain` and `Aout`
//! without disturbing the hot set in `Am`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                        TwoQueueCache<K, V> Layout                           │
//! │                                                                             │
//! │   location: FxHashMap<K, TwoQTier>   (single source of truth for tiers)     │
//! │   ┌──────────┬──────────┐                                                   │
//! │   │  "page1" │  Ain     │                                                   │
//! │   │  "page2" │  Am      │                                                   │
//! │   │  "page3" │  Aout    │                                                   │
//! │   └──────────┴──────────┘                                                   │
//! │                                                                             │
//! │   Ain (HashedQueue, FIFO)     Aout (HashedQueue, FIFO)     Am (LruStore)    │
//! │   ┌───────────────────┐       ┌───────────────────┐       ┌──────────────┐  │
//! │   │ new ...... oldest │──────►│ new ...... oldest │──┐    │ MRU .... LRU │  │
//! │   └───────────────────┘demote └───────────────────┘  │    └──────────────┘  │
//! │            ▲                          │ pop_back     │ promote  ▲    │      │
//! │            │ miss                     ▼              └──────────┘    ▼      │
//! │                                  (leaves cache)               (leaves cache)│
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fetch Flow
//!
//! ```text
//!   fetch(key, loader):
//!     key in Am    ──► touch in Am                         ──► hit
//!     key in Ain   ──► no change                           ──► hit
//!     key in Aout  ──► erase from Aout, Am.add(key, value) ──► hit
//!     otherwise    ──► load_new_elem(key, loader)          ──► miss
//!
//!   load_new_elem:
//!     value = loader(&key)
//!     if Ain full:
//!       if Aout full: Aout.pop_back()
//!       Aout.push_front(Ain.pop_back())
//!     Ain.push_front(key, value)
//! ```
//!
//! A second reference while still in `Ain` deliberately does not promote, so
//! scan traffic stays cheap. Because `Aout` keeps values rather than bare keys,
//! promotion never calls the loader a second time.
//!
//! ## Tier Sizing
//!
//! | Tier   | Capacity                         | Default fraction |
//! |--------|----------------------------------|------------------|
//! | `Ain`  | `max(1, floor(a_in_frac * C))`   | 0.25             |
//! | `Aout` | `max(1, floor(a_out_frac * C))`  | 0.5              |
//! | `Am`   | `max(1, C - Ain - Aout)`         | remainder        |
//!
//! Every tier gets at least one slot, so totals below 3 are rounded up.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::policy::two_q::{TwoQTier, TwoQueueCache};
//!
//! let mut cache = TwoQueueCache::new(8); // Ain 2, Aout 4, Am 2
//! assert!(!cache.fetch(1, |k| k * 10));
//! assert_eq!(cache.tier_of(&1), Some(TwoQTier::Ain));
//!
//! // Push 1 out of Ain with two more first-time keys.
//! cache.fetch(2, |k| k * 10);
//! cache.fetch(3, |k| k * 10);
//! assert_eq!(cache.tier_of(&1), Some(TwoQTier::Aout));
//!
//! // Re-reference promotes into the main store without reloading.
//! assert!(cache.fetch(1, |_| unreachable!()));
//! assert_eq!(cache.tier_of(&1), Some(TwoQTier::Am));
//! assert_eq!(cache.peek(&1), Some(&10));
//! ```
//!
//! ## Thread Safety
//!
//! - [`TwoQueueCache`]: Not thread-safe, designed for single-threaded use
//! - For concurrent access, wrap in external synchronization
//!
//! ## References
//!
//! - Johnson & Shasha, "2Q: A Low Overhead High Performance Buffer Management
//!   Replacement Algorithm", VLDB 1994

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::ds::HashedQueue;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::FetchMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{FetchMetricsRecorder, MetricsSnapshotProvider, TwoQMetricsRecorder};
use crate::policy::lru::LruStore;
use crate::traits::PageCache;

/// Default fraction of the total capacity given to `Ain`.
pub const DEFAULT_A_IN_FRAC: f64 = 0.25;
/// Default fraction of the total capacity given to `Aout`.
pub const DEFAULT_A_OUT_FRAC: f64 = 0.5;

/// Which 2Q tier a key currently lives in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TwoQTier {
    /// First-reference FIFO.
    Ain,
    /// FIFO of entries demoted from `Ain`, values retained.
    Aout,
    /// Recency-tracked main store.
    Am,
}

impl fmt::Display for TwoQTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TwoQTier::Ain => "Ain",
            TwoQTier::Aout => "Aout",
            TwoQTier::Am => "Am",
        })
    }
}

/// Per-tier capacities derived from one total capacity.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TierCapacities {
    pub a_in: usize,
    pub a_out: usize,
    pub am: usize,
}

impl TierCapacities {
    /// Splits `capacity` by the given fractions, giving every tier at least one slot.
    pub fn split(capacity: usize, a_in_frac: f64, a_out_frac: f64) -> Self {
        let a_in = ((capacity as f64 * a_in_frac) as usize).max(1);
        let a_out = ((capacity as f64 * a_out_frac) as usize).max(1);
        let am = capacity.saturating_sub(a_in + a_out).max(1);
        Self { a_in, a_out, am }
    }

    /// Sum of the three tiers.
    pub fn total(&self) -> usize {
        self.a_in + self.a_out + self.am
    }
}

/// Two-Queue cache with a value-retaining `Aout`.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Clone + Eq + Hash`
/// - `V`: Value type
///
/// # Example
///
/// ```
/// use evictkit::policy::two_q::TwoQueueCache;
///
/// let mut cache = TwoQueueCache::new(4);
/// let hits = [1, 2, 3, 4, 2, 3, 4, 4]
///     .into_iter()
///     .filter(|&key| cache.fetch(key, |k| *k))
///     .count();
/// assert_eq!(hits, 4);
/// ```
pub struct TwoQueueCache<K, V> {
    a_in: HashedQueue<K, V>,
    a_out: HashedQueue<K, V>,
    am: LruStore<K, V>,
    /// Authoritative tier membership; mirrors the three containers.
    location: FxHashMap<K, TwoQTier>,
    #[cfg(feature = "metrics")]
    metrics: FetchMetrics,
}

impl<K, V> TwoQueueCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a 2Q cache with total `capacity` and the default tier split.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::policy::two_q::TwoQueueCache;
    ///
    /// let cache: TwoQueueCache<u64, u64> = TwoQueueCache::new(100);
    /// let tiers = cache.tier_capacities();
    /// assert_eq!((tiers.a_in, tiers.a_out, tiers.am), (25, 50, 25));
    /// assert_eq!(cache.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self::with_tiers(TierCapacities::split(
            capacity,
            DEFAULT_A_IN_FRAC,
            DEFAULT_A_OUT_FRAC,
        ))
    }

    /// Creates a 2Q cache with custom tier fractions.
    ///
    /// Both fractions must be finite, strictly between 0 and 1, and sum to
    /// less than 1 so that `Am` keeps a share of the capacity.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::policy::two_q::TwoQueueCache;
    ///
    /// let cache = TwoQueueCache::<u64, u64>::try_with_ratios(10, 0.2, 0.4).unwrap();
    /// assert_eq!(cache.tier_capacities().am, 4);
    ///
    /// assert!(TwoQueueCache::<u64, u64>::try_with_ratios(10, 0.0, 0.4).is_err());
    /// assert!(TwoQueueCache::<u64, u64>::try_with_ratios(10, f64::NAN, 0.4).is_err());
    /// ```
    pub fn try_with_ratios(
        capacity: usize,
        a_in_frac: f64,
        a_out_frac: f64,
    ) -> Result<Self, ConfigError> {
        for (name, frac) in [("a_in_frac", a_in_frac), ("a_out_frac", a_out_frac)] {
            if !frac.is_finite() || frac <= 0.0 || frac >= 1.0 {
                return Err(ConfigError::new(format!(
                    "{name} must be in (0, 1), got {frac}"
                )));
            }
        }
        if a_in_frac + a_out_frac >= 1.0 {
            return Err(ConfigError::new(format!(
                "a_in_frac + a_out_frac must be < 1, got {}",
                a_in_frac + a_out_frac
            )));
        }
        Ok(Self::with_tiers(TierCapacities::split(
            capacity, a_in_frac, a_out_frac,
        )))
    }

    fn with_tiers(tiers: TierCapacities) -> Self {
        debug!(
            a_in = tiers.a_in,
            a_out = tiers.a_out,
            am = tiers.am,
            "created 2Q cache"
        );
        Self {
            a_in: HashedQueue::new(tiers.a_in),
            a_out: HashedQueue::new(tiers.a_out),
            am: LruStore::new(tiers.am),
            location: FxHashMap::default(),
            #[cfg(feature = "metrics")]
            metrics: FetchMetrics::default(),
        }
    }

    /// Requests `key`, calling `loader` only on a miss.
    ///
    /// Returns `true` if `key` was found in any tier.
    pub fn fetch<F>(&mut self, key: K, loader: F) -> bool
    where
        F: FnOnce(&K) -> V,
    {
        PageCache::fetch(self, key, loader)
    }

    /// Fallible form of [`fetch`](Self::fetch).
    ///
    /// A loader error is returned unchanged; no tier is modified.
    pub fn try_fetch<E, F>(&mut self, key: K, loader: F) -> Result<bool, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        match self.location.get(&key).copied() {
            Some(TwoQTier::Am) => {
                let touched = self.am.touch(&key);
                debug_assert!(touched, "location map says Am but the entry is missing");
            },
            Some(TwoQTier::Ain) => {},
            Some(TwoQTier::Aout) => self.promote(key),
            None => {
                self.load_new_elem(key, loader)?;
                return Ok(false);
            },
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_hit();
        Ok(true)
    }

    /// Moves a re-referenced `Aout` entry into `Am`.
    fn promote(&mut self, key: K) {
        let Some(value) = self.a_out.erase(&key) else {
            debug_assert!(false, "location map says Aout but the entry is missing");
            self.location.remove(&key);
            return;
        };

        self.location.insert(key.clone(), TwoQTier::Am);
        if let Some((evicted, _)) = self.am.add(key, value) {
            self.location.remove(&evicted);
            #[cfg(feature = "metrics")]
            self.metrics.record_eviction();
        }
        trace!(am_len = self.am.len(), "2q promoted entry from Aout to Am");
        #[cfg(feature = "metrics")]
        self.metrics.record_promotion();
    }

    /// Admits a first-time key into `Ain`, demoting `Ain`'s oldest if needed.
    fn load_new_elem<E, F>(&mut self, key: K, loader: F) -> Result<(), E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        let value = loader(&key)?;
        #[cfg(feature = "metrics")]
        {
            self.metrics.record_miss();
            self.metrics.record_load();
        }

        if self.a_in.is_full() {
            self.demote_oldest_in();
        }

        self.location.insert(key.clone(), TwoQTier::Ain);
        self.a_in.push_front(key, value);
        Ok(())
    }

    fn demote_oldest_in(&mut self) {
        if self.a_out.is_full() {
            if let Some((forgotten, _)) = self.a_out.pop_back() {
                self.location.remove(&forgotten);
                trace!("2q evicted oldest entry from Aout");
                #[cfg(feature = "metrics")]
                self.metrics.record_eviction();
            }
        }

        if let Some((old_key, old_value)) = self.a_in.pop_back() {
            self.location.insert(old_key.clone(), TwoQTier::Aout);
            self.a_out.push_front(old_key, old_value);
            trace!(a_out_len = self.a_out.len(), "2q demoted oldest Ain entry to Aout");
            #[cfg(feature = "metrics")]
            self.metrics.record_demotion();
        }
    }

    /// Returns the tier `key` lives in, if resident.
    pub fn tier_of(&self, key: &K) -> Option<TwoQTier> {
        self.location.get(key).copied()
    }

    /// Returns the per-tier capacities.
    pub fn tier_capacities(&self) -> TierCapacities {
        TierCapacities {
            a_in: self.a_in.capacity(),
            a_out: self.a_out.capacity(),
            am: self.am.capacity(),
        }
    }

    /// Returns the current `(Ain, Aout, Am)` lengths.
    pub fn tier_lens(&self) -> (usize, usize, usize) {
        (self.a_in.len(), self.a_out.len(), self.am.len())
    }

    /// Returns the resident value for `key` without moving it.
    pub fn peek(&self, key: &K) -> Option<&V> {
        match self.location.get(key)? {
            TwoQTier::Ain => self.a_in.get(key),
            TwoQTier::Aout => self.a_out.get(key),
            TwoQTier::Am => self.am.peek(key),
        }
    }

    /// Returns `true` if `key` is resident in any tier.
    pub fn contains(&self, key: &K) -> bool {
        self.location.contains_key(key)
    }

    /// Number of resident entries across all tiers.
    pub fn len(&self) -> usize {
        self.location.len()
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
    }

    /// Total capacity across all tiers.
    pub fn capacity(&self) -> usize {
        self.tier_capacities().total()
    }

    /// Drops every entry from every tier.
    pub fn clear(&mut self) {
        self.a_in.clear();
        self.a_out.clear();
        self.am.clear();
        self.location.clear();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Verifies that the location map and the three containers agree.
    ///
    /// Checks every tier against its capacity, that each key is held by
    /// exactly the tier the location map names, and that no container holds
    /// a key the map does not know about.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let tiers = [
            (TwoQTier::Ain, self.a_in.len(), self.a_in.capacity()),
            (TwoQTier::Aout, self.a_out.len(), self.a_out.capacity()),
            (TwoQTier::Am, self.am.len(), self.am.capacity()),
        ];
        for (tier, len, capacity) in tiers {
            if len > capacity {
                return Err(InvariantError::new(format!(
                    "{tier} holds {len} entries, capacity {capacity}"
                )));
            }
        }

        let total = self.a_in.len() + self.a_out.len() + self.am.len();
        if total != self.location.len() {
            return Err(InvariantError::new(format!(
                "tiers hold {total} entries, location map has {}",
                self.location.len()
            )));
        }

        for (key, &tier) in &self.location {
            let membership = [
                (TwoQTier::Ain, self.a_in.contains(key)),
                (TwoQTier::Aout, self.a_out.contains(key)),
                (TwoQTier::Am, self.am.contains(key)),
            ];
            for (candidate, present) in membership {
                if present != (candidate == tier) {
                    return Err(InvariantError::new(format!(
                        "key mapped to {tier} but {candidate} membership is {present}"
                    )));
                }
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.a_in.debug_validate_invariants();
        self.a_out.debug_validate_invariants();
        self.am.debug_validate_invariants();
        if let Err(err) = self.check_invariants() {
            panic!("2Q invariant violated: {err}");
        }
    }
}

impl<K, V> fmt::Debug for TwoQueueCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwoQueueCache")
            .field("tiers", &self.tier_capacities())
            .field("lens", &self.tier_lens())
            .finish()
    }
}

impl<K, V> PageCache<K, V> for TwoQueueCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn try_fetch<E, F>(&mut self, key: K, loader: F) -> Result<bool, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        TwoQueueCache::try_fetch(self, key, loader)
    }

    fn contains(&self, key: &K) -> bool {
        self.location.contains_key(key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        TwoQueueCache::peek(self, key)
    }

    fn len(&self) -> usize {
        self.location.len()
    }

    fn capacity(&self) -> usize {
        TwoQueueCache::capacity(self)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<CacheMetricsSnapshot> for TwoQueueCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot(self.len(), self.capacity())
    }
}

#[cfg(feature = "metrics")]
impl<K, V> TwoQueueCache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn run(capacity: usize, requests: &[i32]) -> usize {
        let mut cache = TwoQueueCache::new(capacity);
        let hits = requests
            .iter()
            .filter(|&&key| cache.fetch(key, |k| *k))
            .count();
        cache.debug_validate_invariants();
        hits
    }

    #[test]
    fn tier_split_defaults() {
        assert_eq!(
            TierCapacities::split(15, DEFAULT_A_IN_FRAC, DEFAULT_A_OUT_FRAC),
            TierCapacities { a_in: 3, a_out: 7, am: 5 }
        );
        assert_eq!(
            TierCapacities::split(4, DEFAULT_A_IN_FRAC, DEFAULT_A_OUT_FRAC),
            TierCapacities { a_in: 1, a_out: 2, am: 1 }
        );
        assert_eq!(
            TierCapacities::split(3, DEFAULT_A_IN_FRAC, DEFAULT_A_OUT_FRAC),
            TierCapacities { a_in: 1, a_out: 1, am: 1 }
        );
    }

    #[test]
    fn tiny_capacities_are_clamped() {
        for capacity in [0, 1, 2] {
            let cache: TwoQueueCache<u8, u8> = TwoQueueCache::new(capacity);
            let tiers = cache.tier_capacities();
            assert_eq!((tiers.a_in, tiers.a_out, tiers.am), (1, 1, 1));
            assert_eq!(cache.capacity(), 3);
        }
    }

    #[test]
    fn scenario_capacity_15() {
        assert_eq!(run(15, &[1, 2, 3, 4, 5, 6, 7, 1, 2, 6]), 3);
    }

    #[test]
    fn scenario_capacity_4() {
        assert_eq!(run(4, &[1, 2, 3, 4, 2, 3, 4, 4]), 4);
    }

    #[test]
    fn scenario_capacity_1() {
        assert_eq!(run(1, &[1, 2, 3, 4, 5, 5, 5, 1, 2, 3]), 2);
    }

    #[test]
    fn second_reference_in_ain_does_not_promote() {
        let mut cache = TwoQueueCache::new(8);
        cache.fetch(1, |k| *k);
        assert!(cache.fetch(1, |k| *k));
        assert!(cache.fetch(1, |k| *k));
        assert_eq!(cache.tier_of(&1), Some(TwoQTier::Ain));
        assert_eq!(cache.tier_lens(), (1, 0, 0));
    }

    #[test]
    fn overflow_demotes_to_aout_then_forgets() {
        // Ain 1, Aout 1, Am 1
        let mut cache = TwoQueueCache::new(3);
        cache.fetch(1, |k| *k);
        cache.fetch(2, |k| *k);
        assert_eq!(cache.tier_of(&1), Some(TwoQTier::Aout));
        assert_eq!(cache.tier_of(&2), Some(TwoQTier::Ain));

        cache.fetch(3, |k| *k);
        assert_eq!(cache.tier_of(&1), None);
        assert_eq!(cache.tier_of(&2), Some(TwoQTier::Aout));
        assert_eq!(cache.tier_of(&3), Some(TwoQTier::Ain));
        cache.debug_validate_invariants();
    }

    #[test]
    fn promotion_evicts_lru_of_am() {
        // Ain 1, Aout 2, Am 1
        let mut cache = TwoQueueCache::new(4);
        for key in [1, 2, 3] {
            cache.fetch(key, |k| *k);
        }
        // Aout = [2, 1]
        assert!(cache.fetch(1, |_| unreachable!()));
        assert_eq!(cache.tier_of(&1), Some(TwoQTier::Am));
        assert!(cache.fetch(2, |_| unreachable!()));
        assert_eq!(cache.tier_of(&2), Some(TwoQTier::Am));
        assert!(!cache.contains(&1));
        cache.debug_validate_invariants();
    }

    #[test]
    fn am_hit_refreshes_recency() {
        // Ain 2, Aout 4, Am 2
        let mut cache = TwoQueueCache::new(8);
        for key in [1, 2, 3, 4, 1, 2] {
            cache.fetch(key, |k| *k);
        }
        assert_eq!(cache.tier_of(&1), Some(TwoQTier::Am));
        assert_eq!(cache.tier_of(&2), Some(TwoQTier::Am));

        assert!(cache.fetch(1, |_| unreachable!()));
        cache.fetch(5, |k| *k); // demotes 3
        assert!(cache.fetch(3, |_| unreachable!()));

        assert_eq!(cache.tier_of(&3), Some(TwoQTier::Am));
        assert_eq!(cache.tier_of(&1), Some(TwoQTier::Am));
        assert!(!cache.contains(&2));
        cache.debug_validate_invariants();
    }

    #[test]
    fn hot_set_survives_a_scan() {
        let mut cache = TwoQueueCache::new(12); // Ain 3, Aout 6, Am 3
        // Make 100..103 hot: load, push into Aout, re-reference.
        for key in 100..103 {
            cache.fetch(key, |k| *k);
        }
        for key in 0..3 {
            cache.fetch(key, |k| *k);
        }
        for key in 100..103 {
            assert!(cache.fetch(key, |k| *k));
            assert_eq!(cache.tier_of(&key), Some(TwoQTier::Am));
        }

        for key in 1_000..1_100 {
            cache.fetch(key, |k| *k);
        }
        for key in 100..103 {
            assert!(cache.fetch(key, |_| unreachable!()), "hot key {key} lost to scan");
        }
        cache.debug_validate_invariants();
    }

    #[test]
    fn resident_hits_never_reload() {
        let calls = Cell::new(0usize);
        let loader = |k: &u32| {
            calls.set(calls.get() + 1);
            *k
        };
        let mut cache = TwoQueueCache::new(6);
        for key in [1, 2, 3, 4, 1, 2, 1, 1, 2] {
            let before = cache.len();
            let hit = cache.fetch(key, loader);
            if hit {
                assert_eq!(cache.len(), before);
            }
        }
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn loader_error_leaves_tiers_untouched() {
        let mut cache = TwoQueueCache::new(3);
        cache.fetch(1, |k| *k);
        let before = cache.tier_lens();

        let result: Result<bool, String> = cache.try_fetch(2, |k| Err(format!("cannot load {k}")));
        assert_eq!(result, Err("cannot load 2".to_string()));
        assert_eq!(cache.tier_lens(), before);
        assert_eq!(cache.tier_of(&1), Some(TwoQTier::Ain));
        assert!(!cache.contains(&2));
    }

    #[test]
    fn peek_reads_every_tier() {
        let mut cache = TwoQueueCache::new(4);
        for key in [1, 2, 3] {
            cache.fetch(key, |k| k * 10);
        }
        cache.fetch(1, |k| k * 10);
        assert_eq!(cache.peek(&1), Some(&10)); // Am
        assert_eq!(cache.peek(&2), Some(&20)); // Aout
        assert_eq!(cache.peek(&3), Some(&30)); // Ain
        assert_eq!(cache.peek(&4), None);
    }

    #[test]
    fn clear_empties_all_tiers() {
        let mut cache = TwoQueueCache::new(4);
        for key in 0..10 {
            cache.fetch(key, |k| *k);
        }
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.tier_lens(), (0, 0, 0));
        assert!(!cache.fetch(0, |k| *k));
        cache.debug_validate_invariants();
    }

    #[test]
    fn enormous_capacity_allocates_lazily() {
        let mut cache = TwoQueueCache::new(usize::MAX / 2);
        assert!(cache.capacity() > 1 << 40);
        for key in [1u64, 2, 1] {
            cache.fetch(key, |k| *k);
        }
        assert_eq!(cache.len(), 2);
        cache.debug_validate_invariants();
    }

    #[test]
    fn ratio_validation() {
        assert!(TwoQueueCache::<u8, u8>::try_with_ratios(10, 0.25, 0.5).is_ok());
        let err = TwoQueueCache::<u8, u8>::try_with_ratios(10, 1.5, 0.2).unwrap_err();
        assert!(err.message().contains("a_in_frac"));
        let err = TwoQueueCache::<u8, u8>::try_with_ratios(10, 0.3, -0.1).unwrap_err();
        assert!(err.message().contains("a_out_frac"));
        let err = TwoQueueCache::<u8, u8>::try_with_ratios(10, 0.5, 0.5).unwrap_err();
        assert!(err.message().contains("< 1"));
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_count_tier_movements() {
        let mut cache = TwoQueueCache::new(4); // Ain 1, Aout 2, Am 1
        for key in [1, 2, 3, 4, 2, 3, 4, 4] {
            cache.fetch(key, |k| *k);
        }
        let snapshot = cache.metrics_snapshot();
        assert_eq!(snapshot.hits, 4);
        assert_eq!(snapshot.misses, 4);
        assert_eq!(snapshot.loads, 4);
        assert_eq!(snapshot.demotions, 3);
        assert_eq!(snapshot.promotions, 2);
        // 1 forgotten from Aout, 2 evicted from Am by the promotion of 3
        assert_eq!(snapshot.evictions, 2);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;

    proptest! {
        /// Tier capacities and the partition hold after every fetch.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_partition_and_capacity(
            capacity in 0usize..40,
            requests in prop::collection::vec(0u32..64, 0..300)
        ) {
            let mut cache = TwoQueueCache::new(capacity);
            for key in requests {
                cache.fetch(key, |k| *k);
                prop_assert!(cache.check_invariants().is_ok(), "{:?}", cache.check_invariants());
                prop_assert!(cache.len() <= cache.capacity());
                prop_assert!(cache.contains(&key));
            }
        }

        /// The loader runs exactly once per miss, and the stored value is the loaded one.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_one_load_per_miss(
            capacity in 1usize..20,
            requests in prop::collection::vec(0u32..32, 0..200)
        ) {
            let loads = Cell::new(0usize);
            let mut misses = 0usize;
            let mut cache = TwoQueueCache::new(capacity);
            for key in requests {
                let hit = cache.fetch(key, |k| {
                    loads.set(loads.get() + 1);
                    k * 7
                });
                if !hit {
                    misses += 1;
                }
                prop_assert_eq!(cache.peek(&key), Some(&(key * 7)));
            }
            prop_assert_eq!(loads.get(), misses);
        }
    }
}
