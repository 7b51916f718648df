//! Exact solvers module.
//!
//! Held-Karp dynamic programming over (vertex, subset) states. `D(i, s)` is
//! the length of the shortest path that starts at `i`, visits every vertex
//! of `s` exactly once and ends at the depot 0.
//!
//! Three evaluations of the same recurrence are provided:
//! - [`NaiveRecursion`]: plain recursion, recomputes shared states
//! - [`MemoizedRecursion`]: the same recursion with a per-state cache
//! - [`HeldKarpSolver`]: bottom-up table with successor reconstruction

mod held_karp;
mod recursion;

pub use held_karp::*;
pub use recursion::*;

use crate::error::{TspError, TspResult};
use crate::subset::MAX_VERTICES;

/// Marks a table cell that holds no path cost: "not computed yet" in the
/// memo, "no feasible continuation" in the bottom-up table. No real path
/// cost can reach it.
pub const UNSET: u64 = u64::MAX;

/// Check that `n` vertices fit the subset encoding.
pub fn check_vertex_count(n: usize) -> TspResult<()> {
    if (1..=MAX_VERTICES).contains(&n) {
        Ok(())
    } else {
        Err(TspError::InvalidVertexCount {
            vertices: n,
            min: 1,
            max: MAX_VERTICES,
        })
    }
}

/// Bytes needed by an `n × 2^(n-1)` table with `bytes_per_cell` per entry.
pub fn table_bytes(n: usize, bytes_per_cell: usize) -> u128 {
    if n == 0 {
        return 0;
    }
    (n as u128) * (1u128 << (n - 1)) * bytes_per_cell as u128
}

/// Reject tables larger than `limit_bytes` before allocating them.
pub(crate) fn check_table_size(n: usize, bytes_per_cell: usize, limit_bytes: u128) -> TspResult<()> {
    let required_bytes = table_bytes(n, bytes_per_cell);
    if required_bytes > limit_bytes {
        return Err(TspError::TableTooLarge {
            vertices: n,
            required_bytes,
            limit_bytes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_count_domain() {
        assert!(check_vertex_count(1).is_ok());
        assert!(check_vertex_count(32).is_ok());
        assert!(matches!(
            check_vertex_count(0),
            Err(TspError::InvalidVertexCount { vertices: 0, .. })
        ));
        assert!(check_vertex_count(33).is_err());
    }

    #[test]
    fn test_table_bytes() {
        assert_eq!(table_bytes(4, 8), 4 * 8 * 8);
        assert_eq!(table_bytes(1, 9), 9);
        assert_eq!(table_bytes(32, 1), 32u128 << 31);
        assert!(check_table_size(32, 9, 1 << 31).is_err());
        assert!(check_table_size(10, 9, 1 << 31).is_ok());
    }
}
