//! # Cache Trait
//!
//! Every replacement policy in this crate is driven through one operation:
//! `fetch(key, loader)`. The cache either already holds `key` (a hit) or calls
//! `loader` to materialize the value and decides, by its own policy, whether and
//! where to keep it (a miss). Policies differ only in bookkeeping and victim
//! choice, which makes them drop-in replacements for one another in a
//! simulation driver.
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────┐
//!                  │                PageCache<K, V>                   │
//!                  │                                                  │
//!                  │  try_fetch(&mut, K, FnOnce(&K) -> Result<V, E>)  │
//!                  │        -> Result<bool, E>                        │
//!                  │  fetch(&mut, K, FnOnce(&K) -> V) -> bool         │
//!                  │  contains(&, &K) -> bool                         │
//!                  │  peek(&, &K) -> Option<&V>                       │
//!                  │  len / is_empty / capacity                       │
//!                  └─────────────────────────┬────────────────────────┘
//!                                            │
//!              ┌─────────────────────────────┼─────────────────────────────┐
//!              ▼                             ▼                             ▼
//!   ┌─────────────────────┐      ┌───────────────────────┐      ┌─────────────────────┐
//!   │    LruStore<K, V>   │      │  TwoQueueCache<K, V>  │      │  IdealCache<K, V>   │
//!   │  recency order      │      │  Ain / Aout / Am      │      │  future trace       │
//!   └─────────────────────┘      └───────────────────────┘      └─────────────────────┘
//! ```
//!
//! ## Loader Contract
//!
//! | Outcome               | Loader calls | Return                 |
//! |-----------------------|--------------|------------------------|
//! | Hit                   | 0            | `Ok(true)`             |
//! | Miss, admitted        | 1            | `Ok(false)`            |
//! | Miss, bypassed        | 0            | `Ok(false)`            |
//! | Miss, loader failed   | 1            | `Err(e)`, cache as before |
//!
//! Only [`IdealCache`](crate::policy::ideal::IdealCache) bypasses: a key that
//! is never requested again is not worth a slot.
//!
//! ## Thread Safety
//!
//! Caches are single-threaded; all mutation goes through `&mut self`.

use std::convert::Infallible;

/// Common fetch contract shared by every replacement policy.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru::LruStore;
/// use evictkit::traits::PageCache;
///
/// fn count_hits<C: PageCache<u32, u32>>(cache: &mut C, requests: &[u32]) -> usize {
///     requests
///         .iter()
///         .filter(|&&key| cache.fetch(key, |k| *k))
///         .count()
/// }
///
/// let mut lru = LruStore::new(2);
/// assert_eq!(count_hits(&mut lru, &[1, 2, 1, 3, 2]), 1);
/// ```
pub trait PageCache<K, V> {
    /// Requests `key`, loading it with a fallible `loader` on a miss.
    ///
    /// Returns `Ok(true)` on a hit and `Ok(false)` on a miss. A loader error
    /// is returned unchanged and leaves the cache exactly as it was.
    fn try_fetch<E, F>(&mut self, key: K, loader: F) -> Result<bool, E>
    where
        F: FnOnce(&K) -> Result<V, E>;

    /// Requests `key`, loading it with `loader` on a miss.
    ///
    /// Returns `true` on a hit. The loader runs at most once and never on a hit.
    fn fetch<F>(&mut self, key: K, loader: F) -> bool
    where
        F: FnOnce(&K) -> V,
    {
        match self.try_fetch(key, |k| Ok::<V, Infallible>(loader(k))) {
            Ok(hit) => hit,
            Err(never) => match never {},
        }
    }

    /// Returns `true` if `key` is resident. Does not affect eviction order.
    fn contains(&self, key: &K) -> bool;

    /// Returns the resident value for `key` without affecting eviction order.
    fn peek(&self, key: &K) -> Option<&V>;

    /// Number of resident entries.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries.
    fn capacity(&self) -> usize;
}
