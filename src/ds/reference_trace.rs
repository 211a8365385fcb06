//! Immutable future reference trace with next-use lookup.
//!
//! Stores the full request sequence an offline policy is allowed to see, plus
//! the sorted list of positions at which every key occurs. "When is this key
//! needed next?" is then a binary search instead of a scan of the remaining
//! trace, with identical answers.
//!
//! ```text
//!   keys:       [ 1, 2, 3, 1, 2, 5, 1 ]
//!   positions:  1 -> [0, 3, 6]
//!               2 -> [1, 4]
//!               3 -> [2]
//!               5 -> [5]
//!
//!   next_use(&1, 4) == Some(6)      next_use(&3, 3) == None
//! ```
use std::hash::Hash;

use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct ReferenceTrace<K> {
    keys: Vec<K>,
    positions: FxHashMap<K, Vec<usize>>,
}

impl<K> ReferenceTrace<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new(keys: Vec<K>) -> Self {
        let mut positions: FxHashMap<K, Vec<usize>> = FxHashMap::default();
        for (pos, key) in keys.iter().enumerate() {
            positions.entry(key.clone()).or_default().push(pos);
        }
        Self { keys, positions }
    }

    /// Number of requests in the trace.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key requested at `pos`, if `pos` is inside the trace.
    pub fn get(&self, pos: usize) -> Option<&K> {
        self.keys.get(pos)
    }

    pub fn as_slice(&self) -> &[K] {
        &self.keys
    }

    /// Number of distinct keys in the trace.
    pub fn distinct_keys(&self) -> usize {
        self.positions.len()
    }

    /// First position `>= from` at which `key` is requested.
    ///
    /// `None` means the key is never requested again.
    pub fn next_use(&self, key: &K, from: usize) -> Option<usize> {
        let positions = self.positions.get(key)?;
        let idx = positions.partition_point(|&pos| pos < from);
        positions.get(idx).copied()
    }
}
