//! Estimators for the supported geometric models.
//!
//! Each estimator builds its model from a minimal sample and refits it from a
//! consensus set:
//! - [`LineEstimator`]: two points, ordinary least squares refit.
//! - [`PlaneEstimator`]: three points, centroid + SVD refit.

pub mod line;
pub mod plane;

pub use line::LineEstimator;
pub use plane::PlaneEstimator;

/// `true` when all indices in `sample` differ.
pub(crate) fn has_distinct_indices(sample: &[usize]) -> bool {
    sample
        .iter()
        .enumerate()
        .all(|(i, a)| sample[i + 1..].iter().all(|b| a != b))
}
