//! Deterministic random number generation.
//!
//! Park–Miller "minimal standard" linear congruential generator
//! (multiplier 16807, modulus 2^31 − 1), evaluated with Schrage's
//! decomposition so that every intermediate fits in 32 bits.
//!
//! # Reproducibility Guarantee
//!
//! For the same seed and the same call order the stream is bit-identical
//! to every other conforming implementation: seed 1 yields
//! 16807, 282475249, 1622650073, ...
//!
//! The generator is an owned value. Consumers borrow it mutably, so two
//! solves that need independent streams simply own two generators.

use serde::{Deserialize, Serialize};

/// Modulus 2^31 − 1.
pub const MODULUS: i32 = 2_147_483_647;
/// Multiplier of the minimal standard generator.
pub const MULTIPLIER: i32 = 16_807;
/// Schrage quotient `MODULUS / MULTIPLIER`.
const Q: i32 = 127_773;
/// Schrage remainder `MODULUS % MULTIPLIER`.
const R: i32 = 2_836;

/// Minimal standard Park–Miller generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkMiller {
    seed: i32,
}

impl ParkMiller {
    /// Create a generator. Seeds outside `[1, 2^31 − 2]` are folded into it,
    /// since 0 is a fixed point of the recurrence.
    pub fn new(seed: i32) -> Self {
        let seed = if (1..MODULUS).contains(&seed) {
            seed
        } else {
            (seed as i64).rem_euclid(MODULUS as i64 - 1) as i32 + 1
        };
        ParkMiller { seed }
    }

    /// Current state.
    pub fn seed(&self) -> i32 {
        self.seed
    }

    /// Advance the state and return it, a value in `[1, 2^31 − 2]`.
    pub fn advance(&mut self) -> i32 {
        let i = MULTIPLIER * (self.seed % Q) - R * (self.seed / Q);
        self.seed = if i > 0 { i } else { MODULUS + i };
        self.seed
    }

    /// Advance the state and return a value in `[0, n − 1]`.
    ///
    /// This is the plain `state % n` reduction, kept for stream
    /// compatibility rather than for uniformity.
    pub fn next_below(&mut self, n: usize) -> usize {
        debug_assert!(n > 0 && n <= MODULUS as usize, "bound out of range: {}", n);
        (self.advance() as usize) % n
    }
}

impl Default for ParkMiller {
    fn default() -> Self {
        ParkMiller::new(1)
    }
}
