//! Deterministic random number generation for tie-breaks.
//!
//! RULE: The scheduler never calls a platform RNG directly.
//! All randomness flows through TieBreakRng instances derived
//! from the single master seed held by the engine.
//!
//! Each generation run gets its own stream, seeded from
//! (master_seed XOR run_index * golden ratio). This means:
//!   - A run's tie-breaks are reproducible in isolation.
//!   - Replaying the same command sequence with the same seed
//!     yields the same plans.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

const STREAM_SPREAD: u64 = 0x9e37_79b9_7f4a_7c15;

/// A named, seedable RNG used only to break ties between candidates.
pub struct TieBreakRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl TieBreakRng {
    pub fn new(seed: u64) -> Self {
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// One random sort key per candidate, drawn in candidate order.
    pub fn tie_keys(&mut self, n: usize) -> Vec<u64> {
        (0..n).map(|_| self.next_u64()).collect()
    }
}

/// Hands out one RNG stream per generation run.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_generation(&self, run_index: u64) -> TieBreakRng {
        let derived = self.master_seed ^ run_index.wrapping_mul(STREAM_SPREAD);
        TieBreakRng::new(derived).with_name("generation")
    }
}
