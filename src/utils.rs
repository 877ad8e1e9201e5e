//! Random source shared by the samplers.
//!
//! Every sampler owns its own generator; nothing in the crate touches a
//! process-wide RNG, so a fixed seed reproduces a run exactly.

use rand::distributions::uniform::SampleUniform;
use rand::distributions::Uniform;
use rand::prelude::*;

/// Random-number generator backed by a seedable `StdRng`.
pub struct UniformRandomGenerator {
    rng: StdRng,
}

impl Default for UniformRandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformRandomGenerator {
    /// Construct with an entropy seed.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Construct with a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Construct from an optional seed, falling back to entropy.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::new(),
        }
    }

    /// Generate distinct values in `[min, max]` into `out`.
    ///
    /// The caller guarantees the range holds at least `out.len()` values.
    pub fn gen_unique<T>(&mut self, out: &mut [T], min: T, max: T)
    where
        T: Copy + PartialEq + SampleUniform,
    {
        let dist = Uniform::new_inclusive(min, max);
        for i in 0..out.len() {
            loop {
                let candidate = self.rng.sample(&dist);
                if out[..i].iter().all(|&v| v != candidate) {
                    out[i] = candidate;
                    break;
                }
            }
        }
    }

    /// Shuffle `values` in place.
    pub fn shuffle<V>(&mut self, values: &mut [V]) {
        values.shuffle(&mut self.rng);
    }
}
