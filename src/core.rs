//! Core traits and the generic RANSAC pipeline.
//!
//! The pipeline is assembled from small components:
//! - [`Estimator`] builds a [`Model`] from a minimal sample and refits it from
//!   a consensus set.
//! - [`Sampler`] proposes minimal samples.
//! - [`Scoring`] classifies points into inliers and outliers.
//! - [`LocalOptimizer`] refines the best model, either after every
//!   improvement or once after the loop.
//! - [`TerminationCriterion`] decides when the loop may stop early.
//!
//! [`Ransac`] drives them and records the outcome as a [`RansacState`].

use crate::error::RansacError;
use crate::scoring::{mean_inlier_error, Score};
use crate::settings::RansacSettings;
use crate::types::DataMatrix;

/// Relative margin, in units of the inlier threshold, by which a tied
/// candidate's mean residual must beat the best one.
const TIE_BREAK_TOLERANCE: f64 = 1e-9;

/// Geometric model with a per-point error and an explicit invalid state.
///
/// `Default` must produce the invalid model.
pub trait Model: Clone + Default + std::fmt::Debug {
    /// Non-negative error of point-store row `row` under this model.
    fn residual(&self, data: &DataMatrix, row: usize) -> f64;

    /// `false` for models built from degenerate input.
    fn is_valid(&self) -> bool;
}

/// Estimator responsible for generating model hypotheses from minimal samples
/// and refitting them from consensus sets.
pub trait Estimator {
    /// Model type produced by this estimator.
    type Model: Model;

    /// Size of a minimal sample for this estimator.
    fn sample_size(&self) -> usize;

    /// Check whether a given sample can determine a model.
    fn is_valid_sample(&self, data: &DataMatrix, sample: &[usize]) -> bool;

    /// Build a model from a minimal sample. May return an invalid model.
    fn estimate_model(&self, data: &DataMatrix, sample: &[usize]) -> Self::Model;

    /// Least-squares model over a consensus set. May return an invalid model.
    fn refit(&self, data: &DataMatrix, inliers: &[usize]) -> Self::Model;
}

/// Sampler responsible for drawing minimal samples from the data.
pub trait Sampler {
    /// Draw the next candidate sample of `sample_size` indices into
    /// `out_indices`.
    ///
    /// Returns `false` when no further candidate is available for the current
    /// iteration.
    fn sample(&mut self, data: &DataMatrix, sample_size: usize, out_indices: &mut [usize]) -> bool;

    /// Called once at the end of every iteration.
    fn update(&mut self);
}

/// Scoring strategy used to evaluate model quality and determine inliers.
pub trait Scoring<M> {
    /// Score type; larger is better.
    type Score: Clone + PartialOrd + std::fmt::Debug;

    /// Inlier/outlier threshold on the model residual.
    fn threshold(&self) -> f64;

    /// Score a model and write its inlier rows, in point-store order.
    fn score(&self, data: &DataMatrix, model: &M, inliers_out: &mut Vec<usize>) -> Self::Score;
}

/// Local optimization strategy refining a model using its inliers.
pub trait LocalOptimizer<M, Sc: Scoring<M>> {
    /// Returns `(refined_model, refined_score, refined_inliers)`.
    fn run(
        &mut self,
        data: &DataMatrix,
        scoring: &Sc,
        inliers: &[usize],
        model: &M,
        best_score: &Sc::Score,
    ) -> (M, Sc::Score, Vec<usize>);
}

/// Refits the model on all inliers with [`Estimator::refit`] and rescores it.
///
/// Falls back to the input when the consensus set is smaller than a minimal
/// sample or the refit is invalid.
pub struct LeastSquaresOptimizer<E>
where
    E: Estimator,
{
    estimator: E,
}

impl<E> LeastSquaresOptimizer<E>
where
    E: Estimator,
{
    pub fn new(estimator: E) -> Self {
        Self { estimator }
    }
}

impl<E, Sc> LocalOptimizer<E::Model, Sc> for LeastSquaresOptimizer<E>
where
    E: Estimator,
    Sc: Scoring<E::Model>,
{
    fn run(
        &mut self,
        data: &DataMatrix,
        scoring: &Sc,
        inliers: &[usize],
        model: &E::Model,
        best_score: &Sc::Score,
    ) -> (E::Model, Sc::Score, Vec<usize>) {
        if inliers.len() < self.estimator.sample_size() {
            return (model.clone(), best_score.clone(), inliers.to_vec());
        }

        let refined = self.estimator.refit(data, inliers);
        if !refined.is_valid() {
            log::debug!("refit on {} inliers was degenerate", inliers.len());
            return (model.clone(), best_score.clone(), inliers.to_vec());
        }

        let mut refined_inliers = Vec::with_capacity(inliers.len());
        let refined_score = scoring.score(data, &refined, &mut refined_inliers);
        (refined, refined_score, refined_inliers)
    }
}

/// Termination criterion deciding when the RANSAC loop can stop.
pub trait TerminationCriterion<S> {
    /// Returns `true` if the loop should stop now.
    ///
    /// `stagnation` counts evaluated iterations since the best model last
    /// improved.
    fn check(&mut self, best_score: &S, stagnation: usize) -> bool;
}

/// Stop once the best consensus set is large enough, optionally after a
/// window of iterations without improvement.
#[derive(Debug, Clone)]
pub struct ConsensusTermination {
    pub consensus_threshold: usize,
    pub stagnation_limit: Option<usize>,
}

impl ConsensusTermination {
    pub fn from_settings(settings: &RansacSettings) -> Self {
        Self {
            consensus_threshold: settings.consensus_threshold,
            stagnation_limit: settings.stagnation_limit,
        }
    }
}

impl TerminationCriterion<Score> for ConsensusTermination {
    fn check(&mut self, best_score: &Score, stagnation: usize) -> bool {
        if best_score.inlier_count < self.consensus_threshold {
            return false;
        }
        match self.stagnation_limit {
            None => true,
            Some(limit) => stagnation > limit,
        }
    }
}

/// Lifecycle of a RANSAC run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RansacState {
    /// Not started, or the loop is running.
    Iterating,
    /// The termination criterion accepted the best model.
    Converged,
    /// The iteration budget ran out; the best model is usable but unconfirmed.
    Exhausted,
    /// No usable model; the reported model is the invalid default.
    Failed(RansacError),
}

impl RansacState {
    pub fn is_success(&self) -> bool {
        matches!(self, RansacState::Converged | RansacState::Exhausted)
    }
}

/// Generic RANSAC pipeline.
pub struct Ransac<E, Sa, Sc, LO, T>
where
    E: Estimator,
    Sa: Sampler,
    Sc: Scoring<E::Model>,
    LO: LocalOptimizer<E::Model, Sc>,
    T: TerminationCriterion<Sc::Score>,
{
    pub settings: RansacSettings,
    pub estimator: E,
    pub sampler: Sa,
    pub scoring: Sc,
    pub local_optimizer: Option<LO>,
    pub final_optimizer: Option<LO>,
    pub termination: T,

    // Outputs / diagnostics
    pub best_model: Option<E::Model>,
    pub best_inliers: Vec<usize>,
    pub best_score: Option<Sc::Score>,
    pub iteration: usize,
    /// Best inlier count after each iteration.
    pub inlier_history: Vec<usize>,
    pub state: RansacState,
}

impl<E, Sa, Sc, LO, T> Ransac<E, Sa, Sc, LO, T>
where
    E: Estimator,
    Sa: Sampler,
    Sc: Scoring<E::Model>,
    LO: LocalOptimizer<E::Model, Sc>,
    T: TerminationCriterion<Sc::Score>,
{
    /// Create a new pipeline from its components.
    pub fn new(
        settings: RansacSettings,
        estimator: E,
        sampler: Sa,
        scoring: Sc,
        local_optimizer: Option<LO>,
        final_optimizer: Option<LO>,
        termination: T,
    ) -> Self {
        Self {
            settings,
            estimator,
            sampler,
            scoring,
            local_optimizer,
            final_optimizer,
            termination,
            best_model: None,
            best_inliers: Vec::new(),
            best_score: None,
            iteration: 0,
            inlier_history: Vec::new(),
            state: RansacState::Iterating,
        }
    }

    /// Run the sample / score / refit loop over `data`.
    pub fn run(&mut self, data: &DataMatrix) -> RansacState {
        let sample_size = self.estimator.sample_size();
        let mut sample = vec![0usize; sample_size];
        let mut tmp_inliers = Vec::new();
        let max_iterations = self.settings.max_iterations;
        let mut stagnation = 0usize;

        self.best_inliers.clear();
        self.best_model = None;
        self.best_score = None;
        self.iteration = 0;
        self.inlier_history.clear();
        self.state = RansacState::Iterating;

        if data.nrows() < sample_size {
            let err = RansacError::InsufficientData {
                required: sample_size,
                actual: data.nrows(),
            };
            log::warn!("RANSAC failed: {err}");
            self.state = RansacState::Failed(err);
            return self.state.clone();
        }

        while self.iteration < max_iterations {
            let Some(model) = self.draw_model(data, &mut sample) else {
                // No non-degenerate sample this iteration.
                self.sampler.update();
                self.iteration += 1;
                self.inlier_history.push(self.best_inliers.len());
                continue;
            };

            tmp_inliers.clear();
            let score = self.scoring.score(data, &model, &mut tmp_inliers);

            if self.is_better(data, &model, &score, &tmp_inliers) {
                log::debug!(
                    "iteration {}: {} inliers (previous best {})",
                    self.iteration,
                    tmp_inliers.len(),
                    self.best_inliers.len()
                );
                self.best_score = Some(score);
                self.best_model = Some(model);
                self.best_inliers.clear();
                self.best_inliers.extend_from_slice(&tmp_inliers);
                stagnation = 0;

                if let Some(lo) = &mut self.local_optimizer {
                    if let (Some(best_model), Some(best_score)) = (&self.best_model, &self.best_score)
                    {
                        let (refined_model, refined_score, refined_inliers) = lo.run(
                            data,
                            &self.scoring,
                            &self.best_inliers,
                            best_model,
                            best_score,
                        );
                        if refined_score >= *best_score {
                            self.best_model = Some(refined_model);
                            self.best_score = Some(refined_score);
                            self.best_inliers = refined_inliers;
                        }
                    }
                }
            } else {
                stagnation += 1;
            }

            self.sampler.update();
            self.iteration += 1;
            self.inlier_history.push(self.best_inliers.len());

            if let Some(best_score) = &self.best_score {
                if self.termination.check(best_score, stagnation) {
                    self.state = RansacState::Converged;
                    break;
                }
            }
        }

        if self.state == RansacState::Iterating {
            self.state = RansacState::Exhausted;
        }

        if self.best_inliers.len() < sample_size {
            let err = RansacError::NoConsensusFound {
                iterations: self.iteration,
            };
            log::warn!("RANSAC failed: {err}");
            self.best_model = None;
            self.best_score = None;
            self.best_inliers.clear();
            self.state = RansacState::Failed(err);
            return self.state.clone();
        }

        if let (Some(final_opt), Some(best_model), Some(best_score)) = (
            &mut self.final_optimizer,
            &self.best_model,
            &self.best_score,
        ) {
            let (refined_model, refined_score, refined_inliers) = final_opt.run(
                data,
                &self.scoring,
                &self.best_inliers,
                best_model,
                best_score,
            );
            if refined_score >= *best_score {
                self.best_model = Some(refined_model);
                self.best_score = Some(refined_score);
                self.best_inliers = refined_inliers;
            }
        }

        log::info!(
            "RANSAC {:?} with {} inliers out of {} points after {} iterations",
            self.state,
            self.best_inliers.len(),
            data.nrows(),
            self.iteration
        );
        self.state.clone()
    }

    /// The fitted model, or the invalid default when the run failed.
    pub fn model(&self) -> E::Model {
        self.best_model.clone().unwrap_or_default()
    }

    /// Mean residual of the inliers of `model` under the configured threshold.
    pub fn evaluate_model(&self, data: &DataMatrix, model: &E::Model) -> f64 {
        mean_inlier_error(data, model, self.scoring.threshold())
    }

    /// A candidate replaces the best when its score is higher, or when the
    /// scores tie and its mean inlier residual is lower.
    fn is_better(
        &self,
        data: &DataMatrix,
        model: &E::Model,
        score: &Sc::Score,
        inliers: &[usize],
    ) -> bool {
        let (Some(best_model), Some(best_score)) = (&self.best_model, &self.best_score) else {
            return !inliers.is_empty();
        };
        if *score > *best_score {
            return true;
        }
        if *score != *best_score {
            return false;
        }
        let threshold = self.scoring.threshold();
        let error = mean_inlier_error(data, model, threshold);
        let best_error = mean_inlier_error(data, best_model, threshold);
        error < best_error - TIE_BREAK_TOLERANCE * threshold
    }

    /// Draw samples until one yields a valid model, bounded by
    /// `max_sample_attempts`.
    fn draw_model(&mut self, data: &DataMatrix, sample: &mut [usize]) -> Option<E::Model> {
        let sample_size = sample.len();
        for _ in 0..self.settings.max_sample_attempts {
            if !self.sampler.sample(data, sample_size, sample) {
                break;
            }
            if !self.estimator.is_valid_sample(data, sample) {
                continue;
            }
            let model = self.estimator.estimate_model(data, sample);
            if model.is_valid() {
                return Some(model);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::scoring::ConsensusScoring;
    use crate::types::DataMatrix;

    /// 1-D "model": a single value; points are scalars.
    #[derive(Clone, Debug, Default, PartialEq)]
    struct MockModel(Option<f64>);

    impl Model for MockModel {
        fn residual(&self, data: &DataMatrix, row: usize) -> f64 {
            match self.0 {
                Some(v) => (data[(row, 0)] - v).abs(),
                None => f64::INFINITY,
            }
        }

        fn is_valid(&self) -> bool {
            self.0.is_some()
        }
    }

    struct MockEstimator;

    impl Estimator for MockEstimator {
        type Model = MockModel;

        fn sample_size(&self) -> usize {
            1
        }

        fn is_valid_sample(&self, _data: &DataMatrix, sample: &[usize]) -> bool {
            sample.len() == 1
        }

        fn estimate_model(&self, data: &DataMatrix, sample: &[usize]) -> Self::Model {
            MockModel(Some(data[(sample[0], 0)]))
        }

        fn refit(&self, data: &DataMatrix, inliers: &[usize]) -> Self::Model {
            if inliers.is_empty() {
                return MockModel(None);
            }
            let sum: f64 = inliers.iter().map(|&i| data[(i, 0)]).sum();
            MockModel(Some(sum / inliers.len() as f64))
        }
    }

    /// Visits rows in order, one candidate per iteration.
    struct SequentialSampler {
        next: usize,
        update_calls: usize,
    }

    impl Sampler for SequentialSampler {
        fn sample(&mut self, data: &DataMatrix, _sample_size: usize, out: &mut [usize]) -> bool {
            out[0] = self.next % data.nrows();
            true
        }

        fn update(&mut self) {
            self.next += 1;
            self.update_calls += 1;
        }
    }

    /// Never produces a sample.
    struct EmptySampler;

    impl Sampler for EmptySampler {
        fn sample(&mut self, _data: &DataMatrix, _size: usize, _out: &mut [usize]) -> bool {
            false
        }

        fn update(&mut self) {}
    }

    type MockRansac<Sa> = Ransac<
        MockEstimator,
        Sa,
        ConsensusScoring<MockModel>,
        LeastSquaresOptimizer<MockEstimator>,
        ConsensusTermination,
    >;

    fn pipeline<Sa: Sampler>(
        settings: RansacSettings,
        sampler: Sa,
        final_refit: bool,
    ) -> MockRansac<Sa> {
        let scoring = ConsensusScoring::new(settings.inlier_threshold);
        let termination = ConsensusTermination::from_settings(&settings);
        let final_optimizer = final_refit.then(|| LeastSquaresOptimizer::new(MockEstimator));
        Ransac::new(
            settings,
            MockEstimator,
            sampler,
            scoring,
            None,
            final_optimizer,
            termination,
        )
    }

    fn column(values: &[f64]) -> DataMatrix {
        DataMatrix::from_column_slice(values.len(), 1, values)
    }

    #[test]
    fn converges_immediately_without_stagnation_limit() {
        // Rows 0..3 cluster around 1.0, rows 3.. are outliers.
        let data = column(&[1.0, 1.05, 0.95, 10.0, -7.0]);
        let settings = RansacSettings::line(0.2, 50, 3);
        let mut ransac = pipeline(settings, SequentialSampler { next: 0, update_calls: 0 }, false);

        let state = ransac.run(&data);

        assert_eq!(state, RansacState::Converged);
        assert_eq!(ransac.iteration, 1);
        assert_eq!(ransac.best_inliers, vec![0, 1, 2]);
        assert_eq!(ransac.sampler.update_calls, 1);
    }

    #[test]
    fn stagnation_limit_delays_convergence() {
        let data = column(&[1.0, 1.05, 0.95, 10.0, -7.0]);
        let settings = RansacSettings::line(0.2, 100, 3).with_stagnation_limit(Some(4));
        let mut ransac = pipeline(settings, SequentialSampler { next: 0, update_calls: 0 }, false);

        let state = ransac.run(&data);

        // Improvement at iteration 0, then 5 iterations without improvement.
        assert_eq!(state, RansacState::Converged);
        assert_eq!(ransac.iteration, 6);
    }

    #[test]
    fn exhausted_run_keeps_best_model() {
        let data = column(&[1.0, 1.05, 0.95, 10.0, -7.0]);
        let settings = RansacSettings::line(0.2, 5, 4);
        let mut ransac = pipeline(settings, SequentialSampler { next: 0, update_calls: 0 }, false);

        let state = ransac.run(&data);

        assert_eq!(state, RansacState::Exhausted);
        assert_eq!(ransac.iteration, 5);
        assert_eq!(ransac.best_inliers.len(), 3);
        assert_eq!(ransac.model(), MockModel(Some(1.0)));
    }

    #[test]
    fn final_refit_replaces_minimal_model() {
        let data = column(&[1.0, 1.1, 0.9, 10.0]);
        let settings = RansacSettings::plane(0.25, 4, 3);
        let mut ransac = pipeline(settings, SequentialSampler { next: 0, update_calls: 0 }, true);

        ransac.run(&data);

        let value = ransac.model().0.unwrap();
        assert!((value - 1.0).abs() < 1e-12);
        assert_eq!(ransac.best_inliers, vec![0, 1, 2]);
    }

    #[test]
    fn equal_count_prefers_lower_mean_residual() {
        // Every candidate from rows 0..3 has 3 inliers; row 2 fits them best.
        let data = column(&[0.0, 0.15, 0.1, 5.0]);
        let settings = RansacSettings::line(0.2, 4, usize::MAX);
        let mut ransac = pipeline(settings, SequentialSampler { next: 0, update_calls: 0 }, false);

        let state = ransac.run(&data);

        assert_eq!(state, RansacState::Exhausted);
        assert_eq!(ransac.model(), MockModel(Some(0.1)));
        assert_eq!(ransac.best_inliers, vec![0, 1, 2]);
        assert_eq!(ransac.inlier_history, vec![3, 3, 3, 3]);
    }

    #[test]
    fn equal_residual_keeps_first_model() {
        // Rows 0 and 1 both have 2 inliers with mean residuals that differ
        // only by rounding.
        let data = column(&[1.0, 1.2, 1.1, 9.0]);
        let settings = RansacSettings::line(0.15, 2, usize::MAX);
        let mut ransac = pipeline(settings, SequentialSampler { next: 0, update_calls: 0 }, false);

        ransac.run(&data);

        assert_eq!(ransac.model(), MockModel(Some(1.0)));
        assert_eq!(ransac.best_inliers, vec![0, 2]);
    }

    #[test]
    fn inlier_history_is_non_decreasing() {
        let data = column(&[10.0, 1.0, 1.05, 0.95, 1.02, -7.0, 1.01]);
        let settings = RansacSettings::line(0.2, 30, usize::MAX);
        let mut ransac = pipeline(settings, SequentialSampler { next: 0, update_calls: 0 }, false);

        ransac.run(&data);

        assert_eq!(ransac.inlier_history.len(), 30);
        assert!(ransac.inlier_history.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*ransac.inlier_history.last().unwrap(), 5);
    }

    #[test]
    fn too_few_points_fail_before_sampling() {
        let data = DataMatrix::zeros(0, 1);
        let mut ransac = pipeline(
            RansacSettings::line(0.2, 10, 1),
            SequentialSampler { next: 0, update_calls: 0 },
            false,
        );

        let state = ransac.run(&data);

        assert_eq!(
            state,
            RansacState::Failed(RansacError::InsufficientData {
                required: 1,
                actual: 0
            })
        );
        assert_eq!(ransac.iteration, 0);
        assert_eq!(ransac.model(), MockModel::default());
    }

    #[test]
    fn no_candidate_fails_with_no_consensus() {
        let data = column(&[1.0, 2.0, 3.0]);
        let mut ransac = pipeline(RansacSettings::line(0.2, 7, 1), EmptySampler, false);

        let state = ransac.run(&data);

        assert_eq!(
            state,
            RansacState::Failed(RansacError::NoConsensusFound { iterations: 7 })
        );
        assert!(ransac.best_model.is_none());
        assert!(!ransac.model().is_valid());
        assert!(ransac.inlier_history.iter().all(|&c| c == 0));
    }

    #[test]
    fn evaluate_model_uses_configured_threshold() {
        let data = column(&[1.0, 1.1, 0.9, 10.0]);
        let ransac = pipeline(
            RansacSettings::line(0.25, 4, 3),
            SequentialSampler { next: 0, update_calls: 0 },
            false,
        );

        let err = ransac.evaluate_model(&data, &MockModel(Some(1.0)));
        assert!((err - 0.2 / 3.0).abs() < 1e-12);
    }
}
