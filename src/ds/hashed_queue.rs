//! Bounded, key-indexed queue of `(key, value)` entries.
//!
//! The building block for every tier in this crate: the 2Q admission and
//! overflow FIFOs, the storage behind [`LruStore`](crate::policy::lru::LruStore)
//! and the resident set of [`IdealCache`](crate::policy::ideal::IdealCache).
//! Implemented as an entry list plus a key index.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>        list: EntryList<K, V>
//!   ┌─────────┬─────────┐              head ─► [C] ◄──► [B] ◄──► [A] ◄── tail
//!   │  key A  │  id_1   │               newest                    oldest
//!   │  key B  │  id_2   │
//!   │  key C  │  id_3   │
//!   └─────────┴─────────┘
//! ```
//!
//! ## Behavior
//! - `push_front(k, v)`: admits a new entry as the newest member
//! - `erase(k)`: deletes from list and index
//! - `pop_back()`: evicts the oldest entry from list and index
//! - `peek_oldest()`: inspects the next eviction candidate
//!
//! The queue makes no policy decisions. Callers keep keys unique and make room
//! before pushing; both are checked with debug assertions.
//!
//! ## Performance
//! - `push_front` / `erase` / `pop_back` / `contains`: O(1) average
//!
//! Storage grows with the number of resident entries; `capacity` is only an
//! upper bound, never reserved up front.
//!
//! `debug_validate_invariants()` is available in debug/test builds.
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::entry_list::EntryList;
use crate::ds::slot_arena::SlotId;

/// Bounded ordered set of entries with O(1) keyed removal.
#[derive(Debug)]
pub struct HashedQueue<K, V> {
    list: EntryList<K, V>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K, V> HashedQueue<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a queue holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            list: EntryList::new(),
            index: FxHashMap::default(),
            capacity,
        }
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.list.len() == 0
    }

    /// Returns `true` when another push would exceed the capacity.
    pub fn is_full(&self) -> bool {
        self.list.len() >= self.capacity
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the value stored for `key` without reordering.
    pub fn get(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = *self.index.get(key)?;
        self.list.value_mut(id)
    }

    /// Inserts a new entry as the newest member.
    ///
    /// `key` must not be present and the queue must not be full.
    pub fn push_front(&mut self, key: K, value: V) {
        debug_assert!(!self.contains(&key), "push_front of a key already queued");
        debug_assert!(!self.is_full(), "push_front into a full queue");

        let id = self.list.push_front(key.clone(), value);
        self.index.insert(key, id);
    }

    /// Removes the entry for `key` and returns its value.
    ///
    /// Returns `None` if `key` is absent, which owning caches treat as a bug.
    pub fn erase(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.list.remove(id).map(|(_, value)| value)
    }

    /// Evicts the oldest entry.
    pub fn pop_back(&mut self) -> Option<(K, V)> {
        let (key, value) = self.list.pop_back()?;
        self.index.remove(&key);
        Some((key, value))
    }

    /// Returns the oldest entry without removing it.
    pub fn peek_oldest(&self) -> Option<(&K, &V)> {
        self.list.back()
    }

    /// Makes `key` the newest member; returns `false` if absent.
    pub(crate) fn move_to_front(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => self.list.move_to_front(id),
            None => false,
        }
    }

    /// Iterates entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list.iter()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.list.debug_validate_invariants();
        assert_eq!(self.list.len(), self.index.len());
        assert!(self.list.len() <= self.capacity);
        for (key, &id) in &self.index {
            let (stored, _) = self.list.get(id).expect("index points at a freed slot");
            assert!(stored == key, "index key does not match list entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<V>(queue: &HashedQueue<u32, V>) -> Vec<u32> {
        queue.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn push_front_and_pop_back_are_fifo() {
        let mut queue = HashedQueue::new(3);
        queue.push_front(1, "one");
        queue.push_front(2, "two");
        queue.push_front(3, "three");
        assert!(queue.is_full());
        assert_eq!(keys(&queue), vec![3, 2, 1]);

        assert_eq!(queue.peek_oldest(), Some((&1, &"one")));
        assert_eq!(queue.pop_back(), Some((1, "one")));
        assert!(!queue.contains(&1));
        assert_eq!(queue.len(), 2);
        queue.debug_validate_invariants();
    }

    #[test]
    fn erase_removes_from_list_and_index() {
        let mut queue = HashedQueue::new(4);
        for k in 1..=4 {
            queue.push_front(k, k * 10);
        }
        assert_eq!(queue.erase(&2), Some(20));
        assert_eq!(queue.erase(&2), None);
        assert_eq!(keys(&queue), vec![4, 3, 1]);
        assert_eq!(queue.get(&2), None);
        queue.debug_validate_invariants();
    }

    #[test]
    fn pop_back_on_empty_is_none() {
        let mut queue: HashedQueue<u32, u32> = HashedQueue::new(2);
        assert_eq!(queue.pop_back(), None);
        assert_eq!(queue.peek_oldest(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut queue = HashedQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        assert!(!queue.is_full());
        queue.push_front("page", 1);
        assert!(queue.is_full());
    }

    #[test]
    fn move_to_front_reorders_without_resizing() {
        let mut queue = HashedQueue::new(3);
        queue.push_front(1, ());
        queue.push_front(2, ());
        queue.push_front(3, ());
        assert!(queue.move_to_front(&1));
        assert!(!queue.move_to_front(&9));
        assert_eq!(keys(&queue), vec![1, 3, 2]);
        assert_eq!(queue.peek_oldest().map(|(k, _)| *k), Some(2));
        queue.debug_validate_invariants();
    }

    #[test]
    fn get_mut_and_clear() {
        let mut queue = HashedQueue::new(2);
        queue.push_front("a", 1);
        if let Some(value) = queue.get_mut(&"a") {
            *value = 5;
        }
        assert_eq!(queue.get(&"a"), Some(&5));

        queue.clear();
        assert!(queue.is_empty());
        assert!(!queue.contains(&"a"));
        queue.push_front("a", 6);
        assert_eq!(queue.get(&"a"), Some(&6));
        queue.debug_validate_invariants();
    }

    #[test]
    fn huge_capacity_reserves_nothing_up_front() {
        let mut queue = HashedQueue::new(usize::MAX);
        assert_eq!(queue.capacity(), usize::MAX);
        assert!(!queue.is_full());
        queue.push_front(1u64, [0u8; 64]);
        assert_eq!(queue.len(), 1);
        queue.debug_validate_invariants();
    }

    #[test]
    #[should_panic(expected = "full queue")]
    #[cfg(debug_assertions)]
    fn push_into_full_queue_is_caught() {
        let mut queue = HashedQueue::new(1);
        queue.push_front(1, ());
        queue.push_front(2, ());
    }
}
