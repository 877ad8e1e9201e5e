//! Consensus scoring.
//!
//! A point is an inlier when its residual is strictly below the tolerance.
//! Invalid models report [`INVALID_DISTANCE`] for every point, and are
//! short-circuited to an empty consensus set so they can never be selected.

use crate::core::{Model, Scoring};
use crate::models::INVALID_DISTANCE;
use crate::types::DataMatrix;
use std::marker::PhantomData;

/// Inlier-count score. Ordered by inlier count only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score {
    pub inlier_count: usize,
}

impl Score {
    pub fn new(inlier_count: usize) -> Self {
        Self { inlier_count }
    }
}

/// RANSAC-style scoring counting points within the tolerance of a model.
pub struct ConsensusScoring<M> {
    threshold: f64,
    _marker: PhantomData<M>,
}

impl<M> ConsensusScoring<M> {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            _marker: PhantomData,
        }
    }
}

impl<M: Model> Scoring<M> for ConsensusScoring<M> {
    type Score = Score;

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn score(&self, data: &DataMatrix, model: &M, inliers_out: &mut Vec<usize>) -> Self::Score {
        inliers_out.clear();
        if !model.is_valid() {
            return Score::default();
        }

        inliers_out.extend((0..data.nrows()).filter(|&i| model.residual(data, i) < self.threshold));
        Score::new(inliers_out.len())
    }
}

/// Mean residual over the points that are inliers of `model`.
///
/// Returns [`INVALID_DISTANCE`] for an invalid model or when no point is an
/// inlier. Usable to compare models fitted in separate runs.
pub fn mean_inlier_error<M: Model>(data: &DataMatrix, model: &M, threshold: f64) -> f64 {
    if !model.is_valid() {
        return INVALID_DISTANCE;
    }

    let (total, count) = (0..data.nrows())
        .map(|i| model.residual(data, i))
        .filter(|&r| r < threshold)
        .fold((0.0, 0usize), |(total, count), r| (total + r, count + 1));

    if count == 0 {
        return INVALID_DISTANCE;
    }
    total / count as f64
}
