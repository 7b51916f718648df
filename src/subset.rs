//! Sets of non-depot vertices packed into a 32-bit word.
//!
//! Vertex `v` (1..=32) is stored at bit `v - 1`; the depot is never a member.
//! The packed word doubles as the column index of the Held-Karp tables, which
//! is why `bits()` is exposed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest vertex count whose non-depot vertices fit in the backing word.
pub const MAX_VERTICES: usize = 32;

/// A set of vertices drawn from `1..=32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VertexSubset(u32);

impl VertexSubset {
    /// The empty set.
    pub const EMPTY: VertexSubset = VertexSubset(0);

    #[inline]
    fn bit(vertex: usize) -> u32 {
        debug_assert!((1..=MAX_VERTICES).contains(&vertex), "vertex {} out of range", vertex);
        1u32 << (vertex - 1)
    }

    /// The set `{1, ..., n - 1}` of every non-depot vertex of an `n`-vertex instance.
    pub fn full(n: usize) -> Self {
        debug_assert!((1..=MAX_VERTICES).contains(&n), "vertex count {} out of range", n);
        VertexSubset(((1u64 << (n - 1)) - 1) as u32)
    }

    /// Rebuild a set from its packed form.
    #[inline]
    pub fn from_bits(bits: u32) -> Self {
        VertexSubset(bits)
    }

    /// Packed form, usable as a table column.
    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn contains(self, vertex: usize) -> bool {
        self.0 & Self::bit(vertex) != 0
    }

    /// `self ∪ {vertex}`.
    #[inline]
    pub fn insert(self, vertex: usize) -> Self {
        VertexSubset(self.0 | Self::bit(vertex))
    }

    /// `self \ {vertex}`. Removing a non-member leaves the set unchanged.
    #[inline]
    pub fn remove(self, vertex: usize) -> Self {
        VertexSubset(self.0 & !Self::bit(vertex))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in increasing order.
    pub fn iter(self) -> SubsetIter {
        SubsetIter { rest: self.0 }
    }
}

/// Iterator over the members of a [`VertexSubset`].
pub struct SubsetIter {
    rest: u32,
}

impl Iterator for SubsetIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.rest == 0 {
            return None;
        }
        let low = self.rest.trailing_zeros() as usize;
        self.rest &= self.rest - 1;
        Some(low + 1)
    }
}

impl fmt::Display for VertexSubset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (k, v) in self.iter().enumerate() {
            if k > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_set_members() {
        let s = VertexSubset::full(5);
        assert_eq!(s.bits(), 0b1111);
        assert!(!s.contains(5));
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert!(VertexSubset::full(1).is_empty());
        assert_eq!(VertexSubset::full(32).len(), 31);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let s = VertexSubset::EMPTY.insert(3).insert(7);
        assert_eq!(s.remove(4), s);
        assert_eq!(s.remove(3).remove(3), VertexSubset::EMPTY.insert(7));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let s = VertexSubset::EMPTY.insert(32);
        assert_eq!(s.insert(32), s);
        assert_eq!(s.bits(), 1 << 31);
    }

    #[test]
    fn test_display() {
        let s = VertexSubset::EMPTY.insert(1).insert(4);
        assert_eq!(s.to_string(), "{1 4}");
        assert_eq!(VertexSubset::EMPTY.to_string(), "{}");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_insert_then_contains(bits in any::<u32>(), e in 1usize..=32) {
            let s = VertexSubset::from_bits(bits);
            prop_assert!(s.insert(e).contains(e));
            prop_assert!(!s.insert(e).remove(e).contains(e));
        }

        #[test]
        fn prop_full_excludes_depot_and_n(n in 1usize..=32) {
            let s = VertexSubset::full(n);
            prop_assert_eq!(s.len(), n - 1);
            for v in 1..n {
                prop_assert!(s.contains(v));
            }
            if n < 32 {
                prop_assert!(!s.contains(n));
            }
        }
    }
}
