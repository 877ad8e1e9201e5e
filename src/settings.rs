//! RANSAC configuration.
//!
//! `RansacSettings` is bound once when the pipeline is constructed and never
//! mutated by a run. The named constructors carry the per-model defaults:
//! lines refit on every improvement and converge as soon as the consensus
//! threshold is reached; planes refit once at the end and wait for a
//! stagnation window before converging.

use crate::error::RansacError;

/// Where the least-squares refit runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalOptimizationType {
    None,
    Lsq,
}

/// Main configuration object for the RANSAC pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RansacSettings {
    /// Points with residual strictly below this value are inliers.
    pub inlier_threshold: f64,
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Inlier count at which the run may stop early.
    pub consensus_threshold: usize,
    /// Iterations without improvement required before stopping early.
    ///
    /// `None` stops as soon as `consensus_threshold` is reached.
    pub stagnation_limit: Option<usize>,
    /// Refit after every improvement of the best model.
    pub local_optimization: LocalOptimizationType,
    /// Refit the best consensus set once after the loop.
    pub final_optimization: LocalOptimizationType,
    /// Maximum number of candidate samples tried per iteration.
    pub max_sample_attempts: usize,
    /// Fixed seed for reproducible sampling.
    pub random_seed: Option<u64>,
}

impl Default for RansacSettings {
    fn default() -> Self {
        Self {
            inlier_threshold: 1.0,
            max_iterations: 1000,
            consensus_threshold: usize::MAX,
            stagnation_limit: None,
            local_optimization: LocalOptimizationType::None,
            final_optimization: LocalOptimizationType::Lsq,
            max_sample_attempts: 100,
            random_seed: None,
        }
    }
}

impl RansacSettings {
    /// Line defaults: refit on every improvement, converge immediately.
    pub fn line(inlier_threshold: f64, max_iterations: usize, consensus_threshold: usize) -> Self {
        Self {
            inlier_threshold,
            max_iterations,
            consensus_threshold,
            stagnation_limit: None,
            local_optimization: LocalOptimizationType::Lsq,
            final_optimization: LocalOptimizationType::None,
            ..Self::default()
        }
    }

    /// Plane defaults: refit once at the end, converge after a quarter of the
    /// iteration budget passes without improvement.
    pub fn plane(inlier_threshold: f64, max_iterations: usize, consensus_threshold: usize) -> Self {
        Self {
            inlier_threshold,
            max_iterations,
            consensus_threshold,
            stagnation_limit: Some(max_iterations / 4),
            local_optimization: LocalOptimizationType::None,
            final_optimization: LocalOptimizationType::Lsq,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_stagnation_limit(mut self, limit: Option<usize>) -> Self {
        self.stagnation_limit = limit;
        self
    }

    pub fn with_max_sample_attempts(mut self, attempts: usize) -> Self {
        self.max_sample_attempts = attempts;
        self
    }

    /// Check parameter ranges before a run.
    pub fn validate(&self) -> Result<(), RansacError> {
        if !(self.inlier_threshold.is_finite() && self.inlier_threshold > 0.0) {
            return Err(RansacError::InvalidParameter(format!(
                "inlier threshold must be positive and finite, got {}",
                self.inlier_threshold
            )));
        }
        if self.max_iterations == 0 {
            return Err(RansacError::InvalidParameter(
                "max_iterations must be positive".to_string(),
            ));
        }
        if self.consensus_threshold == 0 {
            return Err(RansacError::InvalidParameter(
                "consensus_threshold must be positive".to_string(),
            ));
        }
        if self.max_sample_attempts == 0 {
            return Err(RansacError::InvalidParameter(
                "max_sample_attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Consensus threshold expressed as a fraction of the input size, truncated.
///
/// `consensus_threshold_from_fraction(16, 0.6) == 9`.
pub fn consensus_threshold_from_fraction(num_points: usize, fraction: f64) -> usize {
    let threshold = (fraction * num_points as f64).floor();
    if threshold.is_finite() && threshold > 0.0 {
        threshold as usize
    } else {
        1
    }
}
