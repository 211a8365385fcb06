//! Recency-ordered list of `(key, value)` entries with stable handles.
//!
//! Entries sit in a [`SlotArena`] and point at their neighbours by
//! [`SlotId`]. A handle returned by [`EntryList::push_front`] survives every
//! unrelated insert, move or removal, which is what lets
//! [`HashedQueue`](crate::ds::HashedQueue) keep handles in its key index.
//!
//! ```text
//!   newest ─► [C] ◄──► [B] ◄──► [A] ◄─ oldest
//!             ▲                  ▲
//!            head               tail
//! ```
use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    newer: Option<SlotId>,
    older: Option<SlotId>,
}

#[derive(Debug)]
pub(crate) struct EntryList<K, V> {
    slots: SlotArena<Entry<K, V>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<K, V> EntryList<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn get(&self, id: SlotId) -> Option<(&K, &V)> {
        self.slots.get(id).map(|entry| (&entry.key, &entry.value))
    }

    pub(crate) fn value_mut(&mut self, id: SlotId) -> Option<&mut V> {
        self.slots.get_mut(id).map(|entry| &mut entry.value)
    }

    /// The oldest entry.
    pub(crate) fn back(&self) -> Option<(&K, &V)> {
        self.get(self.tail?)
    }

    pub(crate) fn push_front(&mut self, key: K, value: V) -> SlotId {
        let id = self.slots.insert(Entry {
            key,
            value,
            newer: None,
            older: None,
        });
        self.link_front(id);
        id
    }

    pub(crate) fn pop_back(&mut self) -> Option<(K, V)> {
        self.remove(self.tail?)
    }

    pub(crate) fn remove(&mut self, id: SlotId) -> Option<(K, V)> {
        self.unlink(id)?;
        let entry = self.slots.remove(id)?;
        Some((entry.key, entry.value))
    }

    /// Makes `id` the newest entry; `false` if the handle is stale.
    pub(crate) fn move_to_front(&mut self, id: SlotId) -> bool {
        if self.head == Some(id) {
            return self.slots.get(id).is_some();
        }
        if self.unlink(id).is_none() {
            return false;
        }
        self.link_front(id);
        true
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let entry = self.slots.get(cursor?)?;
            cursor = entry.older;
            Some((&entry.key, &entry.value))
        })
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    fn link_front(&mut self, id: SlotId) {
        let old_head = self.head.replace(id);
        if let Some(entry) = self.slots.get_mut(id) {
            entry.newer = None;
            entry.older = old_head;
        }
        match old_head.and_then(|head| self.slots.get_mut(head)) {
            Some(previous_head) => previous_head.newer = Some(id),
            None => self.tail = Some(id),
        }
    }

    fn unlink(&mut self, id: SlotId) -> Option<()> {
        let entry = self.slots.get_mut(id)?;
        let (newer, older) = (entry.newer.take(), entry.older.take());

        match newer.and_then(|n| self.slots.get_mut(n)) {
            Some(newer_entry) => newer_entry.older = older,
            None => self.head = older,
        }
        match older.and_then(|o| self.slots.get_mut(o)) {
            Some(older_entry) => older_entry.newer = newer,
            None => self.tail = newer,
        }
        Some(())
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn debug_validate_invariants(&self) {
        let mut walked = 0usize;
        let mut expected_newer = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let entry = self.slots.get(id).expect("list links a freed slot");
            assert_eq!(entry.newer, expected_newer, "broken back link");
            walked += 1;
            assert!(walked <= self.len(), "cycle in entry list");
            expected_newer = Some(id);
            cursor = entry.older;
        }
        assert_eq!(self.tail, expected_newer, "tail is not the last entry");
        assert_eq!(walked, self.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &EntryList<char, u32>) -> String {
        list.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn newest_first_oldest_last() {
        let mut list = EntryList::new();
        for (key, value) in [('a', 1), ('b', 2), ('c', 3)] {
            list.push_front(key, value);
        }
        assert_eq!(keys(&list), "cba");
        assert_eq!(list.back(), Some((&'a', &1)));
        assert_eq!(list.pop_back(), Some(('a', 1)));
        assert_eq!(list.pop_back(), Some(('b', 2)));
        assert_eq!(keys(&list), "c");
        list.debug_validate_invariants();
    }

    #[test]
    fn move_to_front_from_every_position() {
        let mut list = EntryList::new();
        let a = list.push_front('a', 0);
        let b = list.push_front('b', 0);
        let c = list.push_front('c', 0);

        assert!(list.move_to_front(c));
        assert_eq!(keys(&list), "cba");
        assert!(list.move_to_front(a));
        assert_eq!(keys(&list), "acb");
        assert!(list.move_to_front(b));
        assert_eq!(keys(&list), "bac");
        list.debug_validate_invariants();

        list.remove(b);
        assert!(!list.move_to_front(b));
        assert_eq!(keys(&list), "ac");
    }

    #[test]
    fn remove_keeps_neighbours_linked() {
        let mut list = EntryList::new();
        let c = list.push_front('c', 3);
        let b = list.push_front('b', 2);
        let a = list.push_front('a', 1);

        assert_eq!(list.remove(b), Some(('b', 2)));
        assert_eq!(keys(&list), "ac");
        assert_eq!(list.remove(a), Some(('a', 1)));
        assert_eq!(list.remove(c), Some(('c', 3)));
        assert_eq!(list.len(), 0);
        assert_eq!(list.back(), None);
        assert_eq!(list.remove(c), None);
        list.debug_validate_invariants();
    }

    #[test]
    fn handle_survives_churn() {
        let mut list = EntryList::new();
        let pinned = list.push_front('p', 10);
        for round in 0..6u32 {
            list.push_front('x', round);
            list.move_to_front(pinned);
            if let Some((&key, _)) = list.back() {
                if key != 'p' {
                    list.pop_back();
                }
            }
        }
        if let Some(value) = list.value_mut(pinned) {
            *value += 1;
        }
        assert_eq!(list.get(pinned), Some((&'p', &11)));
        list.debug_validate_invariants();

        list.clear();
        assert_eq!(list.len(), 0);
        assert_eq!(list.pop_back(), None);
    }
}
