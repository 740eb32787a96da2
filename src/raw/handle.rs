use core::num::NonZero;

/// A link to a node slot in the [`NodeStore`](super::store::NodeStore).
///
/// Slot `i` is stored as `i + 1` so that `Option<Handle>` (an absent child or
/// parent) costs no extra space.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<u32>);

impl Handle {
    pub(crate) const MAX: usize = (u32::MAX - 1) as usize;

    #[inline]
    pub(crate) const fn from_slot(slot: usize) -> Self {
        assert!(slot <= Self::MAX, "`Handle::from_slot()` - `slot` > `Handle::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        match NonZero::new((slot + 1) as u32) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn slot(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // Absent links must be free.
    assert_eq_size!(Handle, Option<Handle>);
    assert_eq_size!(Handle, u32);

    #[test]
    #[should_panic(expected = "`Handle::from_slot()` - `slot` > `Handle::MAX`!")]
    fn slot_past_max() {
        let _ = Handle::from_slot(Handle::MAX + 1);
    }

    proptest! {
        #[test]
        fn slot_survives_encoding(slot in 0..=Handle::MAX) {
            prop_assert_eq!(Handle::from_slot(slot).slot(), slot);
        }
    }
}
