//! # consensus-fit - robust line and plane fitting with RANSAC
//!
//! `consensus_fit` estimates a geometric model from points contaminated with
//! outliers. Each iteration draws a minimal sample, builds a candidate model,
//! and counts the points within a tolerance of it; the candidate with the
//! largest consensus set is refined with least squares (lines) or a
//! centroid + SVD total least squares fit (planes).
//!
//! ## Quick Start
//!
//! ```rust
//! use consensus_fit::{estimate_line, RansacSettings};
//! use consensus_fit::types::data_from_points2;
//!
//! let points = data_from_points2(&[[0.0, 1.0], [1.0, 3.0], [2.0, 5.0], [3.0, 7.0], [1.5, 40.0]]);
//! let settings = RansacSettings::line(0.01, 100, 4).with_seed(7);
//!
//! let result = estimate_line(&points, settings).unwrap();
//! let (m, b) = result.model.to_slope_intercept().unwrap();
//! assert!((m - 2.0).abs() < 1e-9 && (b - 1.0).abs() < 1e-9);
//! assert_eq!(result.inliers, vec![0, 1, 2, 3]);
//! ```
//!
//! ## Extending the Library
//!
//! The pipeline in [`core::Ransac`] is generic over a handful of traits:
//!
//! - **[`Model`](core::Model)**: per-point residual and validity
//! - **[`Estimator`](core::Estimator)**: minimal-sample construction and refit
//! - **[`Sampler`](core::Sampler)**: proposes minimal samples
//! - **[`Scoring<M>`](core::Scoring)**: inlier classification
//! - **[`LocalOptimizer<M, Sc>`](core::LocalOptimizer)**: model refinement
//! - **[`TerminationCriterion<S>`](core::TerminationCriterion)**: early stopping
//!
//! ## Modules
//!
//! - **[`api`]**: high-level estimation functions
//! - **[`core`]**: traits and the `Ransac` pipeline
//! - **[`estimators`]**: line and plane estimators
//! - **[`models`]**: `Line` and `Plane`
//! - **[`samplers`]**: uniform and shuffle-scan samplers
//! - **[`scoring`]**: consensus scoring and model evaluation
//! - **[`settings`]**: configuration

pub mod api;
pub mod core;
pub mod error;
pub mod estimators;
pub mod models;
pub mod samplers;
pub mod scoring;
pub mod settings;
pub mod types;
pub mod utils;

pub use api::{estimate_line, estimate_plane, evaluate_model, EstimationResult};
pub use core::{
    Estimator, LocalOptimizer, Model, Ransac, RansacState, Sampler, Scoring, TerminationCriterion,
};
pub use error::RansacError;
pub use models::{Line, Plane};
pub use settings::RansacSettings;
