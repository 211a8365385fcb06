//! Slot storage addressed by stable integer handles.
//!
//! A [`SlotId`] stays valid until its own slot is freed. Freed slots are
//! recycled before the backing vector grows, so storage tracks peak occupancy
//! rather than any configured bound.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SlotId(usize);

#[derive(Debug)]
pub(crate) struct SlotArena<T> {
    slots: Vec<Option<T>>,
    vacant: Vec<usize>,
    occupied: usize,
}

impl<T> SlotArena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            occupied: 0,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> SlotId {
        self.occupied += 1;
        if let Some(idx) = self.vacant.pop() {
            debug_assert!(self.slots[idx].is_none(), "vacant slot {idx} holds a value");
            self.slots[idx] = Some(value);
            return SlotId(idx);
        }
        self.slots.push(Some(value));
        SlotId(self.slots.len() - 1)
    }

    pub(crate) fn remove(&mut self, id: SlotId) -> Option<T> {
        let value = self.slots.get_mut(id.0)?.take()?;
        self.vacant.push(id.0);
        self.occupied -= 1;
        Some(value)
    }

    pub(crate) fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.0)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.occupied
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.vacant.clear();
        self.occupied = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_slot_is_recycled() {
        let mut arena = SlotArena::new();
        let page_a = arena.insert("page-a");
        let page_b = arena.insert("page-b");
        assert_eq!(arena.get(page_b), Some(&"page-b"));

        assert_eq!(arena.remove(page_a), Some("page-a"));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(page_a), None);

        let page_c = arena.insert("page-c");
        assert_eq!(page_c, page_a);
        assert_eq!(arena.slots.len(), 2);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn stale_and_unknown_handles_are_absent() {
        let mut arena = SlotArena::new();
        let id = arena.insert(7u32);
        assert_eq!(arena.remove(id), Some(7));
        assert_eq!(arena.remove(id), None);
        assert_eq!(arena.get_mut(SlotId(42)), None);
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn clear_releases_every_slot() {
        let mut arena = SlotArena::new();
        for page in 0..5 {
            arena.insert(page);
        }
        arena.clear();
        assert_eq!(arena.len(), 0);
        assert!(arena.slots.is_empty());
        assert_eq!(arena.insert(9), SlotId(0));
    }
}
