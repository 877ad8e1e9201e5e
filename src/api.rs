//! High-level entry points.
//!
//! These functions assemble the generic [`Ransac`] pipeline with the sampler,
//! scoring, refit, and termination components appropriate for each model.

use crate::core::{
    ConsensusTermination, Estimator, LeastSquaresOptimizer, Model, Ransac, RansacState, Sampler,
};
use crate::error::RansacError;
use crate::estimators::{LineEstimator, PlaneEstimator};
use crate::models::{Line, Plane};
use crate::samplers::{ShuffleScanSampler, UniformRandomSampler};
use crate::scoring::{mean_inlier_error, ConsensusScoring, Score};
use crate::settings::{LocalOptimizationType, RansacSettings};
use crate::types::DataMatrix;

/// Result of a successful RANSAC estimation.
#[derive(Debug, Clone)]
pub struct EstimationResult<M> {
    /// The estimated model.
    pub model: M,
    /// Indices of inlier points, in input order.
    pub inliers: Vec<usize>,
    /// Score of the estimated model.
    pub score: Score,
    /// Number of iterations performed.
    pub iterations: usize,
    /// `Converged` or `Exhausted`.
    pub state: RansacState,
    /// Mean residual of the inliers.
    pub mean_error: f64,
}

/// Robustly fit `y = m*x + b` (or a vertical line) to 2-D points.
///
/// # Arguments
/// * `points` - Nx2 matrix of `(x, y)` rows
/// * `settings` - usually built with [`RansacSettings::line`]
///
/// Fails with [`RansacError::InsufficientData`] for fewer than 2 points and
/// [`RansacError::NoConsensusFound`] when no usable line was found.
pub fn estimate_line(
    points: &DataMatrix,
    settings: RansacSettings,
) -> Result<EstimationResult<Line>, RansacError> {
    check_columns(points, 2)?;
    let sampler = UniformRandomSampler::from_optional_seed(settings.random_seed);
    estimate::<LineEstimator, _>(points, settings, sampler)
}

/// Robustly fit a plane to 3-D points.
///
/// # Arguments
/// * `points` - Nx3 matrix of `(x, y, z)` rows
/// * `settings` - usually built with [`RansacSettings::plane`]
///
/// Fails with [`RansacError::InsufficientData`] for fewer than 3 points and
/// [`RansacError::NoConsensusFound`] when no usable plane was found.
pub fn estimate_plane(
    points: &DataMatrix,
    settings: RansacSettings,
) -> Result<EstimationResult<Plane>, RansacError> {
    check_columns(points, 3)?;
    let sampler = ShuffleScanSampler::from_optional_seed(settings.random_seed);
    estimate::<PlaneEstimator, _>(points, settings, sampler)
}

/// Mean inlier residual of any model over `points`, for comparing models
/// fitted in separate runs.
pub fn evaluate_model<M: Model>(points: &DataMatrix, model: &M, tolerance: f64) -> f64 {
    mean_inlier_error(points, model, tolerance)
}

fn check_columns(points: &DataMatrix, expected: usize) -> Result<(), RansacError> {
    if points.ncols() != expected {
        return Err(RansacError::DimensionMismatch {
            expected,
            actual: points.ncols(),
        });
    }
    Ok(())
}

fn estimate<E, Sa>(
    data: &DataMatrix,
    settings: RansacSettings,
    sampler: Sa,
) -> Result<EstimationResult<E::Model>, RansacError>
where
    E: Estimator + Default,
    Sa: Sampler,
{
    settings.validate()?;

    let optimizer = |kind: LocalOptimizationType| match kind {
        LocalOptimizationType::Lsq => Some(LeastSquaresOptimizer::new(E::default())),
        LocalOptimizationType::None => None,
    };
    let local_optimizer = optimizer(settings.local_optimization);
    let final_optimizer = optimizer(settings.final_optimization);
    let scoring = ConsensusScoring::<E::Model>::new(settings.inlier_threshold);
    let termination = ConsensusTermination::from_settings(&settings);

    let mut ransac = Ransac::new(
        settings,
        E::default(),
        sampler,
        scoring,
        local_optimizer,
        final_optimizer,
        termination,
    );

    match ransac.run(data) {
        RansacState::Failed(err) => Err(err),
        state => {
            let model = ransac.model();
            Ok(EstimationResult {
                mean_error: ransac.evaluate_model(data, &model),
                model,
                inliers: std::mem::take(&mut ransac.best_inliers),
                score: ransac.best_score.unwrap_or_default(),
                iterations: ransac.iteration,
                state,
            })
        }
    }
}
