//! Heuristics module for the TSP.
//! 
//! This module exports the random tour construction and the local search
//! methods built on 2-opt.

pub mod construction;
pub mod local_search;

pub use construction::*;
pub use local_search::*;
