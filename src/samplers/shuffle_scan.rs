//! Shuffle-and-scan sampler.

use crate::core::Sampler;
use crate::types::DataMatrix;
use crate::utils::UniformRandomGenerator;

/// Default number of windows offered per iteration.
pub const DEFAULT_MAX_WINDOWS: usize = 10;

/// Shuffles the full index sequence once per iteration, then offers
/// consecutive windows `[k, k + sample_size)` of the permutation.
///
/// At most `min(max_windows, n - sample_size + 1)` windows are offered before
/// [`Sampler::sample`] reports exhaustion; [`Sampler::update`] starts a new
/// permutation for the next iteration.
pub struct ShuffleScanSampler {
    rng: UniformRandomGenerator,
    indices: Vec<usize>,
    cursor: usize,
    max_windows: usize,
}

impl Default for ShuffleScanSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ShuffleScanSampler {
    pub fn new() -> Self {
        Self::with_rng(UniformRandomGenerator::new())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(UniformRandomGenerator::from_seed(seed))
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        Self::with_rng(UniformRandomGenerator::from_optional_seed(seed))
    }

    fn with_rng(rng: UniformRandomGenerator) -> Self {
        Self {
            rng,
            indices: Vec::new(),
            cursor: 0,
            max_windows: DEFAULT_MAX_WINDOWS,
        }
    }

    pub fn with_max_windows(mut self, max_windows: usize) -> Self {
        self.max_windows = max_windows;
        self
    }
}

impl Sampler for ShuffleScanSampler {
    fn sample(&mut self, data: &DataMatrix, sample_size: usize, out_indices: &mut [usize]) -> bool {
        let n = data.nrows();
        if sample_size == 0 || sample_size > n || out_indices.len() < sample_size {
            return false;
        }

        let windows = self.max_windows.min(n - sample_size + 1);
        if self.cursor >= windows {
            return false;
        }

        if self.cursor == 0 {
            if self.indices.len() != n {
                self.indices = (0..n).collect();
            }
            self.rng.shuffle(&mut self.indices);
        }

        out_indices[..sample_size]
            .copy_from_slice(&self.indices[self.cursor..self.cursor + sample_size]);
        self.cursor += 1;
        true
    }

    fn update(&mut self) {
        self.cursor = 0;
    }
}
