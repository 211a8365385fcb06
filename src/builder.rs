//! Unified cache builder for all replacement policies.
//!
//! Lets a driver pick a policy at runtime (for example from a command-line
//! flag) and get back one [`Cache`] type that dispatches to the concrete
//! implementation.
//!
//! ## Example
//!
//! ```rust
//! use evictkit::builder::{CacheBuilder, CachePolicy};
//!
//! let policy: CachePolicy = "2q".parse().unwrap();
//! let mut cache = CacheBuilder::new(100).build::<u64, String>(policy).unwrap();
//! assert!(!cache.fetch(1, |k| format!("page {k}")));
//! assert!(cache.fetch(1, |_| unreachable!()));
//! ```
//!
//! The offline policy needs the future it will be asked about:
//!
//! ```rust
//! use evictkit::builder::{CacheBuilder, CachePolicy};
//!
//! let requests = vec![1, 2, 1, 3, 1];
//! let mut cache = CacheBuilder::new(1)
//!     .trace(requests.clone())
//!     .build::<i32, i32>(CachePolicy::Ideal)
//!     .unwrap();
//! let hits = requests.into_iter().filter(|&k| cache.fetch(k, |k| *k)).count();
//! assert_eq!(hits, 2);
//! ```

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::ConfigError;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::policy::ideal::IdealCache;
use crate::policy::lru::LruStore;
use crate::policy::two_q::TwoQueueCache;
use crate::traits::PageCache;

/// Available cache replacement policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    /// Least Recently Used.
    Lru,
    /// Two-Queue with a value-retaining `Aout`.
    TwoQ,
    /// Belady's offline optimum; requires a reference trace.
    Ideal,
}

impl CachePolicy {
    /// Every policy, in display order.
    pub const ALL: [CachePolicy; 3] = [CachePolicy::Lru, CachePolicy::TwoQ, CachePolicy::Ideal];

    /// Canonical lowercase name, accepted back by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            CachePolicy::Lru => "lru",
            CachePolicy::TwoQ => "2q",
            CachePolicy::Ideal => "ideal",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for CachePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(CachePolicy::Lru),
            "2q" | "two-q" | "twoq" => Ok(CachePolicy::TwoQ),
            "ideal" | "belady" | "opt" => Ok(CachePolicy::Ideal),
            other => Err(ConfigError::new(format!(
                "unknown policy `{other}` (expected lru, 2q or ideal)"
            ))),
        }
    }
}

/// Unified cache wrapper that provides one API regardless of policy.
#[derive(Debug)]
pub struct Cache<K, V>
where
    K: Clone + Eq + Hash,
{
    inner: CacheInner<K, V>,
}

#[derive(Debug)]
enum CacheInner<K, V>
where
    K: Clone + Eq + Hash,
{
    Lru(LruStore<K, V>),
    TwoQ(TwoQueueCache<K, V>),
    Ideal(IdealCache<K, V>),
}

impl<K, V> Cache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// The policy this cache was built with.
    pub fn policy(&self) -> CachePolicy {
        match &self.inner {
            CacheInner::Lru(_) => CachePolicy::Lru,
            CacheInner::TwoQ(_) => CachePolicy::TwoQ,
            CacheInner::Ideal(_) => CachePolicy::Ideal,
        }
    }

    /// Requests `key`, calling `loader` only on a miss. Returns `true` on a hit.
    pub fn fetch<F>(&mut self, key: K, loader: F) -> bool
    where
        F: FnOnce(&K) -> V,
    {
        PageCache::fetch(self, key, loader)
    }

    /// Fallible form of [`fetch`](Self::fetch).
    pub fn try_fetch<E, F>(&mut self, key: K, loader: F) -> Result<bool, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.try_fetch(key, loader),
            CacheInner::TwoQ(two_q) => two_q.try_fetch(key, loader),
            CacheInner::Ideal(ideal) => ideal.try_fetch(key, loader),
        }
    }

    /// Check if a key is resident.
    pub fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::Lru(lru) => lru.contains(key),
            CacheInner::TwoQ(two_q) => two_q.contains(key),
            CacheInner::Ideal(ideal) => ideal.contains(key),
        }
    }

    /// Resident value for `key`, without touching eviction order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        match &self.inner {
            CacheInner::Lru(lru) => lru.peek(key),
            CacheInner::TwoQ(two_q) => two_q.peek(key),
            CacheInner::Ideal(ideal) => ideal.peek(key),
        }
    }

    /// Return the number of resident entries.
    pub fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(lru) => lru.len(),
            CacheInner::TwoQ(two_q) => two_q.len(),
            CacheInner::Ideal(ideal) => ideal.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(lru) => lru.capacity(),
            CacheInner::TwoQ(two_q) => two_q.capacity(),
            CacheInner::Ideal(ideal) => ideal.capacity(),
        }
    }

    /// Drop all entries. The ideal cache also rewinds to the start of its trace.
    pub fn clear(&mut self) {
        match &mut self.inner {
            CacheInner::Lru(lru) => lru.clear(),
            CacheInner::TwoQ(two_q) => two_q.clear(),
            CacheInner::Ideal(ideal) => ideal.reset(),
        }
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        match &self.inner {
            CacheInner::Lru(lru) => lru.metrics_snapshot(),
            CacheInner::TwoQ(two_q) => two_q.metrics_snapshot(),
            CacheInner::Ideal(ideal) => ideal.metrics_snapshot(),
        }
    }
}

impl<K, V> PageCache<K, V> for Cache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn try_fetch<E, F>(&mut self, key: K, loader: F) -> Result<bool, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        Cache::try_fetch(self, key, loader)
    }

    fn contains(&self, key: &K) -> bool {
        Cache::contains(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        Cache::peek(self, key)
    }

    fn len(&self) -> usize {
        Cache::len(self)
    }

    fn capacity(&self) -> usize {
        Cache::capacity(self)
    }
}

/// Where a builder gets its reference trace from.
///
/// Implemented for `()` (no trace) and `Vec<K>`.
pub trait TraceSource<K> {
    fn into_trace(self) -> Option<Vec<K>>;
}

impl<K> TraceSource<K> for () {
    fn into_trace(self) -> Option<Vec<K>> {
        None
    }
}

impl<K> TraceSource<K> for Vec<K> {
    fn into_trace(self) -> Option<Vec<K>> {
        Some(self)
    }
}

/// Builder for creating cache instances.
#[derive(Debug, Clone)]
pub struct CacheBuilder<T = ()> {
    capacity: usize,
    two_q_ratios: Option<(f64, f64)>,
    trace: T,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            two_q_ratios: None,
            trace: (),
        }
    }
}

impl<T> CacheBuilder<T> {
    /// Supply the future reference trace used by [`CachePolicy::Ideal`].
    ///
    /// Ignored by the online policies.
    pub fn trace<K>(self, keys: Vec<K>) -> CacheBuilder<Vec<K>> {
        CacheBuilder {
            capacity: self.capacity,
            two_q_ratios: self.two_q_ratios,
            trace: keys,
        }
    }

    /// Override the 2Q `Ain` / `Aout` fractions (defaults 0.25 / 0.5).
    pub fn two_q_ratios(mut self, a_in_frac: f64, a_out_frac: f64) -> Self {
        self.two_q_ratios = Some((a_in_frac, a_out_frac));
        self
    }

    /// Build a cache with the specified policy.
    ///
    /// # Type Parameters
    ///
    /// - `K`: Key type, must be `Clone + Eq + Hash`
    /// - `V`: Value type
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if `Ideal` is requested without a trace, or if custom
    /// 2Q ratios are out of range.
    ///
    /// # Example
    ///
    /// ```rust
    /// use evictkit::builder::{CacheBuilder, CachePolicy};
    ///
    /// let lru = CacheBuilder::new(100).build::<u64, String>(CachePolicy::Lru).unwrap();
    /// assert_eq!(lru.capacity(), 100);
    ///
    /// let two_q = CacheBuilder::new(10)
    ///     .two_q_ratios(0.2, 0.4)
    ///     .build::<u64, String>(CachePolicy::TwoQ)
    ///     .unwrap();
    /// assert_eq!(two_q.capacity(), 10);
    /// ```
    pub fn build<K, V>(self, policy: CachePolicy) -> Result<Cache<K, V>, ConfigError>
    where
        K: Clone + Eq + Hash,
        T: TraceSource<K>,
    {
        let inner = match policy {
            CachePolicy::Lru => CacheInner::Lru(LruStore::new(self.capacity)),
            CachePolicy::TwoQ => match self.two_q_ratios {
                Some((a_in, a_out)) => {
                    CacheInner::TwoQ(TwoQueueCache::try_with_ratios(self.capacity, a_in, a_out)?)
                },
                None => CacheInner::TwoQ(TwoQueueCache::new(self.capacity)),
            },
            CachePolicy::Ideal => {
                let trace = self.trace.into_trace().ok_or_else(|| {
                    ConfigError::new("the ideal policy needs a reference trace")
                })?;
                CacheInner::Ideal(IdealCache::new(self.capacity, trace))
            },
        };

        Ok(Cache { inner })
    }
}
