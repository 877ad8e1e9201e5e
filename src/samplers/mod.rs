//! Sampling strategies for minimal samples.
//!
//! - [`UniformRandomSampler`] draws independent samples without replacement;
//!   the pipeline redraws while the estimator rejects them as degenerate.
//! - [`ShuffleScanSampler`] shuffles all indices once per iteration and offers
//!   consecutive windows of the permutation, which copes better with data that
//!   contains many collinear subsets.

pub mod shuffle_scan;
pub mod uniform;

pub use shuffle_scan::ShuffleScanSampler;
pub use uniform::UniformRandomSampler;
