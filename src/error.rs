//! Error types surfaced by the fitting pipeline.

use thiserror::Error;

/// Reasons a RANSAC run cannot produce a usable model.
///
/// Degenerate minimal samples are not represented here: they are recovered
/// inside the loop by resampling or skipping the iteration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RansacError {
    /// Fewer points than the minimal sample size of the model.
    #[error("model requires at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimal sample size of the model.
        required: usize,
        /// Number of points supplied.
        actual: usize,
    },

    /// The iteration budget ran out without a usable consensus set.
    #[error("no consensus set found after {iterations} iterations")]
    NoConsensusFound {
        /// Iterations performed before giving up.
        iterations: usize,
    },

    /// The point store has the wrong number of coordinates per point.
    #[error("points must have {expected} coordinates, got {actual}")]
    DimensionMismatch {
        /// Coordinates expected by the model.
        expected: usize,
        /// Columns of the supplied point store.
        actual: usize,
    },

    /// A fitting parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
