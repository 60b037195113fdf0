//! Random noise sources for the reactor model
//!
//! The model never touches a global RNG. Every draw goes through a
//! [`NoiseSource`] handed to it at construction, so runs can be seeded
//! and tests can pin every draw.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform draws in `[low, high)`
pub trait NoiseSource: Send {
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

/// ChaCha8-backed noise, reproducible from a seed
#[derive(Debug, Clone)]
pub struct SeededNoise {
    rng: ChaCha8Rng,
}

impl SeededNoise {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl NoiseSource for SeededNoise {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        // gen_range panics on an empty range
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..high)
    }
}

/// Always returns the middle of the range
///
/// Multiplicative noise becomes exactly 1.0 and additive noise exactly 0,
/// which leaves only the deterministic part of each formula.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidpointNoise;

impl NoiseSource for MidpointNoise {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        (low + high) / 2.0
    }
}

/// Replays a fixed list of unit samples, mapped onto each requested range
///
/// A sample of 0.0 yields `low`, 1.0 yields `high`. Once the list runs out
/// the last sample repeats.
#[derive(Debug, Clone)]
pub struct ScriptedNoise {
    samples: Vec<f64>,
    cursor: usize,
}

impl ScriptedNoise {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples, cursor: 0 }
    }

    /// Number of draws taken so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl NoiseSource for ScriptedNoise {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let unit = match self.samples.get(self.cursor) {
            Some(sample) => *sample,
            None => self.samples.last().copied().unwrap_or(0.5),
        };
        self.cursor += 1;
        low + (high - low) * unit.clamp(0.0, 1.0)
    }
}
