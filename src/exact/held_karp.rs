//! Bottom-up Held-Karp with successor reconstruction.
//!
//! Subsets are processed in increasing numeric order. Removing a member
//! clears a bit, so `s \ {j} < s` and every state read while filling column
//! `s` is already final.

use super::{check_table_size, check_vertex_count, UNSET};
use crate::error::{TspError, TspResult};
use crate::instance::TspInstance;
use crate::solution::Solution;
use crate::subset::VertexSubset;
use std::time::{Duration, Instant};

/// Successor cell that was never written.
const NO_SUCCESSOR: u8 = u8::MAX;

/// Bytes per table cell: one `u64` value plus one `u8` successor.
const CELL_BYTES: usize = std::mem::size_of::<u64>() + std::mem::size_of::<u8>();

/// Held-Karp solver configuration
#[derive(Debug, Clone)]
pub struct HeldKarpConfig {
    /// Upper bound on the memory the DP tables may take
    pub max_table_bytes: u128,
}

impl Default for HeldKarpConfig {
    fn default() -> Self {
        HeldKarpConfig {
            max_table_bytes: 2 << 30,
        }
    }
}

impl HeldKarpConfig {
    pub fn with_limit_mib(mib: u64) -> Self {
        HeldKarpConfig {
            max_table_bytes: (mib as u128) << 20,
        }
    }
}

/// Cost and successor tables, `n` rows by `2^(n-1)` subset columns.
pub struct HeldKarpTable {
    n: usize,
    columns: usize,
    dp: Vec<u64>,
    succ: Vec<u8>,
    states: u64,
}

impl HeldKarpTable {
    #[inline]
    fn cell(&self, i: usize, s: VertexSubset) -> usize {
        i * self.columns + s.bits() as usize
    }

    /// Best cost recorded for `(i, s)`, if any.
    pub fn value(&self, i: usize, s: VertexSubset) -> Option<u64> {
        match self.dp[self.cell(i, s)] {
            UNSET => None,
            v => Some(v),
        }
    }

    /// Successor recorded for `(i, s)`, if any.
    pub fn successor(&self, i: usize, s: VertexSubset) -> Option<usize> {
        match self.succ[self.cell(i, s)] {
            NO_SUCCESSOR => None,
            j => Some(j as usize),
        }
    }

    /// Number of `(i, s)` states computed by [`fill`](Self::fill).
    pub fn states(&self) -> u64 {
        self.states
    }

    /// Best `j ∈ s` for leaving `i`, skipping states with no recorded cost.
    fn best_successor(&self, instance: &TspInstance, i: usize, s: VertexSubset) -> (u64, u8) {
        let mut best = UNSET;
        let mut best_j = NO_SUCCESSOR;
        for j in s.iter() {
            let val = self.dp[self.cell(j, s.remove(j))];
            if val == UNSET {
                continue;
            }
            let alt = instance.distance(i, j) + val;
            if alt < best {
                best = alt;
                best_j = j as u8;
            }
        }
        (best, best_j)
    }

    /// Fill every state and return the optimal circuit length, or [`UNSET`]
    /// if no circuit exists.
    pub fn fill(&mut self, instance: &TspInstance) -> u64 {
        debug_assert_eq!(instance.dimension, self.n);
        let n = self.n;
        let all = VertexSubset::full(n);
        if n == 1 {
            self.dp[0] = 0;
            return 0;
        }

        for i in 1..n {
            let cell = self.cell(i, VertexSubset::EMPTY);
            self.dp[cell] = instance.distance(i, 0);
        }

        for bits in 1..self.columns as u32 {
            let s = VertexSubset::from_bits(bits);
            for i in 1..n {
                if s.contains(i) {
                    continue;
                }
                let (best, best_j) = self.best_successor(instance, i, s);
                let cell = self.cell(i, s);
                self.dp[cell] = best;
                self.succ[cell] = best_j;
                self.states += 1;
            }
        }

        let (best, best_j) = self.best_successor(instance, 0, all);
        let cell = self.cell(0, all);
        self.dp[cell] = best;
        self.succ[cell] = best_j;
        best
    }

    /// Follow successors from the depot with the full subset. The returned
    /// tour starts at 0; the closing edge back to 0 is implicit.
    pub fn reconstruct(&self) -> TspResult<Vec<usize>> {
        let mut s = VertexSubset::full(self.n);
        let mut i = 0;
        let mut tour = Vec::with_capacity(self.n);
        tour.push(0);
        for _ in 1..self.n {
            let j = self.successor(i, s).ok_or(TspError::MissingSuccessor {
                vertex: i,
                subset: s.bits(),
            })?;
            tour.push(j);
            s = s.remove(j);
            i = j;
        }
        debug_assert!(s.is_empty());
        Ok(tour)
    }
}

/// Result of exact solving
#[derive(Debug, Clone)]
pub struct ExactResult {
    /// Optimal tour, starting at the depot
    pub solution: Solution,
    /// Number of table states computed
    pub states: u64,
    /// Time spent allocating the tables
    pub alloc_time: Duration,
    /// Time spent filling and reconstructing
    pub solve_time: Duration,
}

/// Bottom-up Held-Karp solver
pub struct HeldKarpSolver {
    config: HeldKarpConfig,
}

impl HeldKarpSolver {
    pub fn new(config: HeldKarpConfig) -> Self {
        HeldKarpSolver { config }
    }

    /// Allocate empty tables for `instance`, checking the vertex domain and
    /// the memory limit first.
    pub fn allocate(&self, instance: &TspInstance) -> TspResult<HeldKarpTable> {
        let n = instance.dimension;
        check_vertex_count(n)?;
        check_table_size(n, CELL_BYTES, self.config.max_table_bytes)?;
        let columns = 1usize << (n - 1);
        Ok(HeldKarpTable {
            n,
            columns,
            dp: vec![UNSET; n * columns],
            succ: vec![NO_SUCCESSOR; n * columns],
            states: 0,
        })
    }

    /// Solve to optimality
    pub fn solve(&self, instance: &TspInstance) -> TspResult<ExactResult> {
        let start = Instant::now();
        let mut table = self.allocate(instance)?;
        let alloc_time = start.elapsed();
        log::debug!(
            "allocated Held-Karp tables for n={} in {:.3}s",
            instance.dimension,
            alloc_time.as_secs_f64()
        );

        let start = Instant::now();
        let optimum = table.fill(instance);
        let tour = table.reconstruct()?;
        let solve_time = start.elapsed();

        let mut solution = Solution::from_tour(instance, tour, "HeldKarp");
        debug_assert_eq!(solution.length, optimum);
        solution.computation_time = solve_time.as_secs_f64();
        log::info!(
            "Held-Karp optimum {} over {} states in {:.3}s",
            optimum,
            table.states(),
            solve_time.as_secs_f64()
        );

        Ok(ExactResult {
            solution,
            states: table.states(),
            alloc_time,
            solve_time,
        })
    }
}

impl Default for HeldKarpSolver {
    fn default() -> Self {
        Self::new(HeldKarpConfig::default())
    }
}
