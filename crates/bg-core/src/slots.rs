//! Slotted container with stable indices.
//!
//! Removing an element frees its slot instead of shifting its neighbours, so a
//! [`SlotIndex`] handed out by [`StableIndexList::insert`] keeps addressing the
//! same element until that exact index is removed. Freed slots form an
//! intrusive singly-linked free list and are reused most-recently-freed first.

use core::fmt;
use core::ops::{Index, IndexMut};

use crate::SlotIndex;

enum Slot<T> {
    Occupied(T),
    Free { next: Option<SlotIndex> },
}

/// Freelist-backed vector with O(1) insert/remove and index stability.
pub struct StableIndexList<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<SlotIndex>,
    len: usize,
}

impl<T> Default for StableIndexList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StableIndexList<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots currently on the free list.
    pub fn free_slots(&self) -> usize {
        self.slots.len() - self.len
    }

    /// Insert a value, reusing the most recently freed slot if there is one.
    pub fn insert(&mut self, value: T) -> SlotIndex {
        self.len += 1;
        match self.free_head {
            Some(idx) => {
                let slot = &mut self.slots[idx.position()];
                let Slot::Free { next } = *slot else {
                    unreachable!("free list head {idx} points at an occupied slot");
                };
                self.free_head = next;
                *slot = Slot::Occupied(value);
                idx
            }
            None => {
                let position = u32::try_from(self.slots.len())
                    .unwrap_or_else(|_| panic!("StableIndexList exceeded u32 slots"));
                self.slots.push(Slot::Occupied(value));
                SlotIndex::from_index(position)
            }
        }
    }

    /// Remove and return the element at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` was never handed out by this list or was already
    /// removed. Either case means a dangling index is still in use somewhere.
    pub fn remove(&mut self, idx: SlotIndex) -> T {
        let Some(slot) = self.slots.get_mut(idx.position()) else {
            panic!("StableIndexList::remove: index {idx} was never allocated");
        };
        if matches!(slot, Slot::Free { .. }) {
            panic!("StableIndexList::remove: index {idx} removed twice");
        }
        let old = core::mem::replace(
            slot,
            Slot::Free {
                next: self.free_head,
            },
        );
        self.free_head = Some(idx);
        self.len -= 1;
        match old {
            Slot::Occupied(value) => value,
            Slot::Free { .. } => unreachable!(),
        }
    }

    pub fn contains(&self, idx: SlotIndex) -> bool {
        self.get(idx).is_some()
    }

    pub fn get(&self, idx: SlotIndex) -> Option<&T> {
        match self.slots.get(idx.position()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, idx: SlotIndex) -> Option<&mut T> {
        match self.slots.get_mut(idx.position()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Iterate occupied slots in index order, skipping free ones.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.slots.iter().enumerate(),
            remaining: self.len,
        }
    }

    /// Index of the first element matching `pred`, in index order.
    pub fn position(&self, mut pred: impl FnMut(&T) -> bool) -> Option<SlotIndex> {
        self.iter().find(|(_, v)| pred(v)).map(|(idx, _)| idx)
    }
}

impl<T> Index<SlotIndex> for StableIndexList<T> {
    type Output = T;

    fn index(&self, idx: SlotIndex) -> &T {
        match self.get(idx) {
            Some(value) => value,
            None => panic!("StableIndexList: no element at index {idx}"),
        }
    }
}

impl<T> IndexMut<SlotIndex> for StableIndexList<T> {
    fn index_mut(&mut self, idx: SlotIndex) -> &mut T {
        match self.get_mut(idx) {
            Some(value) => value,
            None => panic!("StableIndexList: no element at index {idx}"),
        }
    }
}

impl<T: Clone> Clone for StableIndexList<T> {
    fn clone(&self) -> Self {
        Self {
            slots: self
                .slots
                .iter()
                .map(|slot| match slot {
                    Slot::Occupied(v) => Slot::Occupied(v.clone()),
                    Slot::Free { next } => Slot::Free { next: *next },
                })
                .collect(),
            free_head: self.free_head,
            len: self.len,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StableIndexList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for StableIndexList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for value in iter {
            list.insert(value);
        }
        list
    }
}

impl<'a, T> IntoIterator for &'a StableIndexList<T> {
    type Item = (SlotIndex, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Iterator over `(index, element)` pairs of occupied slots.
pub struct Iter<'a, T> {
    inner: core::iter::Enumerate<core::slice::Iter<'a, Slot<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (SlotIndex, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        for (position, slot) in self.inner.by_ref() {
            if let Slot::Occupied(value) = slot {
                self.remaining -= 1;
                return Some((SlotIndex::from_index(position as u32), value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn surviving_indices_are_stable(n in 1_usize..40, picks in prop::collection::vec(any::<prop::sample::Index>(), 0..20)) {
            let mut list = StableIndexList::new();
            let ids: Vec<_> = (0..n).map(|i| list.insert(i)).collect();

            let mut removed = std::collections::BTreeSet::new();
            for pick in picks {
                let k = pick.index(n);
                if removed.insert(k) {
                    list.remove(ids[k]);
                }
            }

            prop_assert_eq!(list.len(), n - removed.len());
            for (k, &idx) in ids.iter().enumerate() {
                if removed.contains(&k) {
                    prop_assert!(list.get(idx).is_none());
                } else {
                    prop_assert_eq!(list.get(idx), Some(&k));
                }
            }

            let visited: Vec<_> = list.iter().map(|(_, v)| *v).collect();
            let expected: Vec<_> = (0..n).filter(|k| !removed.contains(k)).collect();
            prop_assert_eq!(visited, expected);
        }
    }
}
