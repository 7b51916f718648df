//! Top-down evaluations of the Held-Karp recurrence.

use super::{check_table_size, check_vertex_count, UNSET};
use crate::error::TspResult;
use crate::instance::TspInstance;
use crate::subset::VertexSubset;

/// Unmemoised recursion. Every call re-derives its whole subtree, so the call
/// count grows factorially; useful as a baseline for small `n`.
pub struct NaiveRecursion<'a> {
    instance: &'a TspInstance,
    calls: u64,
}

impl<'a> NaiveRecursion<'a> {
    pub fn new(instance: &'a TspInstance) -> TspResult<Self> {
        check_vertex_count(instance.dimension)?;
        Ok(NaiveRecursion { instance, calls: 0 })
    }

    /// `D(i, s)`. Requires `i ∉ s`.
    pub fn distance(&mut self, i: usize, s: VertexSubset) -> u64 {
        self.calls += 1;
        debug_assert!(i == 0 || !s.contains(i));
        if s.is_empty() {
            return self.instance.distance(i, 0);
        }
        let mut min = UNSET;
        for j in s.iter() {
            let d = self.distance(j, s.remove(j));
            let alt = self.instance.distance(i, j) + d;
            if alt < min {
                min = alt;
            }
        }
        min
    }

    /// Optimal circuit length.
    pub fn solve(&mut self) -> u64 {
        let n = self.instance.dimension;
        if n == 1 {
            // D(0, ∅) with no edge to take
            self.calls += 1;
            return 0;
        }
        self.distance(0, VertexSubset::full(n))
    }

    /// Calls to `distance` so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

/// The same recursion with each `(i, s)` result cached on first computation.
///
/// Cells start at [`UNSET`], which no path cost can equal, so a state whose
/// true value is 0 is still cached correctly.
pub struct MemoizedRecursion<'a> {
    instance: &'a TspInstance,
    memo: Vec<u64>,
    columns: usize,
    calls: u64,
}

impl<'a> MemoizedRecursion<'a> {
    /// Allocate the `n × 2^(n-1)` cache, refusing anything above `max_table_bytes`.
    pub fn new(instance: &'a TspInstance, max_table_bytes: u128) -> TspResult<Self> {
        let n = instance.dimension;
        check_vertex_count(n)?;
        check_table_size(n, std::mem::size_of::<u64>(), max_table_bytes)?;
        let columns = 1usize << (n - 1);
        Ok(MemoizedRecursion {
            instance,
            memo: vec![UNSET; n * columns],
            columns,
            calls: 0,
        })
    }

    /// `D(i, s)`. Requires `i ∉ s`.
    pub fn distance(&mut self, i: usize, s: VertexSubset) -> u64 {
        self.calls += 1;
        debug_assert!(i == 0 || !s.contains(i));
        if s.is_empty() {
            return self.instance.distance(i, 0);
        }
        let cell = i * self.columns + s.bits() as usize;
        if self.memo[cell] != UNSET {
            return self.memo[cell];
        }
        let mut min = UNSET;
        for j in s.iter() {
            let d = self.distance(j, s.remove(j));
            let alt = self.instance.distance(i, j) + d;
            if alt < min {
                min = alt;
            }
        }
        self.memo[cell] = min;
        min
    }

    /// Optimal circuit length.
    pub fn solve(&mut self) -> u64 {
        let n = self.instance.dimension;
        if n == 1 {
            // D(0, ∅) with no edge to take
            self.calls += 1;
            return 0;
        }
        self.distance(0, VertexSubset::full(n))
    }

    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Number of cached states.
    pub fn cached_states(&self) -> usize {
        self.memo.iter().filter(|&&v| v != UNSET).count()
    }
}
