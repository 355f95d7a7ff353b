use std::ops::RangeInclusive;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Randomness source for the synthetic endpoints.
///
/// The handlers never touch `rand` directly — they go through this trait so
/// tests can substitute a rigged implementation that forces the failure
/// branch or pins the delay.
pub trait Chance: Send + Sync {
    /// One uniform draw out of `n`; true with probability 1/n.
    fn one_in(&self, n: u32) -> bool;

    /// Uniform draw from an inclusive range.
    fn pick(&self, range: RangeInclusive<u64>) -> u64;
}

/// Production implementation backed by a seedable `StdRng`.
pub struct SeededChance {
    rng: Mutex<StdRng>,
}

impl SeededChance {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic stream for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Chance for SeededChance {
    fn one_in(&self, n: u32) -> bool {
        self.rng.lock().gen_range(0..n) == 0
    }

    fn pick(&self, range: RangeInclusive<u64>) -> u64 {
        self.rng.lock().gen_range(range)
    }
}
