use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable identifier of an occupied slot in a [`StableIndexList`].
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<SlotIndex>` to be pointer-optimized, which the
///   free list uses for its "next free" links
///
/// [`StableIndexList`]: crate::StableIndexList
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(NonZeroU32);

impl SlotIndex {
    /// Create an index from a 0-based slot position by storing position+1.
    ///
    /// Panics if `index == u32::MAX`.
    pub fn from_index(index: u32) -> Self {
        match index.checked_add(1).and_then(NonZeroU32::new) {
            Some(raw) => Self(raw),
            None => panic!("slot index {index} out of range"),
        }
    }

    /// Recover the 0-based slot position.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    pub(crate) fn position(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotIndex({})", self.index())
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_index_round_trip() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let idx = SlotIndex::from_index(i);
            assert_eq!(idx.index(), i);
        }
    }

    #[test]
    fn option_slot_index_is_small() {
        assert_eq!(
            core::mem::size_of::<SlotIndex>(),
            core::mem::size_of::<Option<SlotIndex>>()
        );
    }

    #[test]
    fn ordering_follows_position() {
        assert!(SlotIndex::from_index(3) < SlotIndex::from_index(7));
    }
}
