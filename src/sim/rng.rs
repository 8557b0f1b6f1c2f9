//! Random sources for spawning and AI jitter
//!
//! The simulation only ever asks for a unit float, so tests can script the
//! exact sequence while real rounds use a seeded PCG32.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Anything that can hand out floats in `[0, 1)`
pub trait RandomSource {
    fn next_unit(&mut self) -> f32;

    /// Uniform float in `[min, max)`
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_unit() * (max - min)
    }

    /// Uniform float in a `(min, max)` tuple range
    fn in_range(&mut self, range: (f32, f32)) -> f32 {
        self.range(range.0, range.1)
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_unit() < p
    }
}

/// Seeded simulation RNG
#[derive(Debug, Clone)]
pub struct SimRng {
    inner: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SimRng {
    fn next_unit(&mut self) -> f32 {
        self.inner.random::<f32>()
    }
}

/// Replays a fixed list of unit values, cycling when exhausted
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    values: Vec<f32>,
    cursor: usize,
}

#[cfg(test)]
impl ScriptedRng {
    pub fn new(values: &[f32]) -> Self {
        assert!(!values.is_empty());
        Self {
            values: values.to_vec(),
            cursor: 0,
        }
    }

    /// Always returns the same value
    pub fn constant(value: f32) -> Self {
        Self::new(&[value])
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRng {
    fn next_unit(&mut self) -> f32 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
