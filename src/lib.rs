//! TSP Solver Library
//!
//! Exact and heuristic solvers for the symmetric Euclidean Travelling
//! Salesman Problem on randomly generated points.
//!
//! # Features
//!
//! - Held-Karp dynamic programming: naive recursion, memoised recursion and
//!   a bottom-up table with optimal tour reconstruction
//! - 2-opt first-improvement descent, iterated local search and random restarts
//! - Park–Miller generator for reproducible instances and tours
//! - Python turtle script, SVG and PNG output of tours
//! - Growth study of the exact solvers against closed-form call counts
//!
//! # Example
//!
//! ```no_run
//! use tsp_solver::exact::HeldKarpSolver;
//! use tsp_solver::heuristics::local_search::{IlsConfig, IteratedLocalSearch};
//! use tsp_solver::{ParkMiller, TspInstance};
//!
//! let mut rng = ParkMiller::new(1);
//! let instance = TspInstance::generate(12, &mut rng);
//!
//! let exact = HeldKarpSolver::default().solve(&instance).unwrap();
//! println!("Optimum: {}", exact.solution.length);
//!
//! let ils = IteratedLocalSearch::new(IlsConfig::with_params(100, 3));
//! let outcome = ils.run(&instance, &mut rng);
//! println!("ILS: {}", outcome.best.length);
//! ```

pub mod benchmark;
pub mod cli;
pub mod error;
pub mod exact;
pub mod heuristics;
pub mod instance;
pub mod rng;
pub mod solution;
pub mod subset;
pub mod visualization;

pub use error::{TspError, TspResult};
pub use instance::TspInstance;
pub use rng::ParkMiller;
pub use solution::Solution;
pub use subset::VertexSubset;
