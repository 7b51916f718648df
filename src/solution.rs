//! Solution representation for the TSP.
//!
//! A tour is a permutation of the vertices read as a cycle: the last vertex
//! connects back to the first. Its length is always derivable from the
//! instance; `length` is a cache that `validate` recomputes.

use crate::instance::TspInstance;
use serde::{Deserialize, Serialize};

/// Represents a solution to the TSP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a permutation of vertex indices
    pub tour: Vec<usize>,
    /// Total closed-tour length
    pub length: u64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a solution from a tour
    pub fn from_tour(instance: &TspInstance, tour: Vec<usize>, algorithm: &str) -> Self {
        let length = instance.tour_length(&tour);
        Solution {
            tour,
            length,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Recompute the cached length from the instance.
    pub fn validate(&mut self, instance: &TspInstance) {
        self.length = instance.tour_length(&self.tour);
    }

    /// Check that every vertex appears exactly once
    pub fn is_complete(&self, instance: &TspInstance) -> bool {
        if self.tour.len() != instance.dimension {
            return false;
        }
        let mut seen = vec![false; instance.dimension];
        for &v in &self.tour {
            if v >= instance.dimension || seen[v] {
                return false;
            }
            seen[v] = true;
        }
        true
    }

    /// The tour written as a closed circuit: every vertex, then the first again.
    pub fn circuit(&self) -> Vec<usize> {
        let mut circuit = self.tour.clone();
        if let Some(&first) = self.tour.first() {
            circuit.push(first);
        }
        circuit
    }

    /// Space-separated closed circuit, e.g. `0 1 3 2 0`.
    pub fn circuit_string(&self) -> String {
        self.circuit()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Apply a 2-opt move (reverse segment between i+1 and j)
    pub fn apply_two_opt(&mut self, i: usize, j: usize) {
        self.tour[i + 1..=j].reverse();
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Length: {}", self.length)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        writeln!(f, "  Circuit: {}", self.circuit_string())
    }
}
