//! Line estimator for 2D line fitting.

use crate::core::Estimator;
use crate::estimators::has_distinct_indices;
use crate::models::Line;
use crate::types::DataMatrix;

/// Squared distance below which two sample points count as coincident.
const COINCIDENT_DIST_SQ: f64 = 1e-10;
/// |dx| below which a two-point sample is treated as vertical.
const VERTICAL_DX: f64 = 1e-12;
/// Relative size of the normal-equation denominator treated as zero.
const SINGULAR_REL: f64 = 1e-12;

/// Line estimator for 2D line fitting.
///
/// Minimal samples are two distinct points. The refit is ordinary least
/// squares on `y = m*x + b`, which minimizes the vertical residual used for
/// scoring.
pub struct LineEstimator;

impl Default for LineEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl LineEstimator {
    pub fn new() -> Self {
        Self
    }
}

impl Estimator for LineEstimator {
    type Model = Line;

    fn sample_size(&self) -> usize {
        2
    }

    fn is_valid_sample(&self, data: &DataMatrix, sample: &[usize]) -> bool {
        if sample.len() < self.sample_size() || data.ncols() < 2 {
            return false;
        }
        if !has_distinct_indices(sample) || sample.iter().any(|&i| i >= data.nrows()) {
            return false;
        }
        let dx = data[(sample[0], 0)] - data[(sample[1], 0)];
        let dy = data[(sample[0], 1)] - data[(sample[1], 1)];
        dx * dx + dy * dy >= COINCIDENT_DIST_SQ
    }

    fn estimate_model(&self, data: &DataMatrix, sample: &[usize]) -> Self::Model {
        if sample.len() < self.sample_size() || data.ncols() < 2 {
            return Line::Degenerate;
        }
        let (x1, y1) = (data[(sample[0], 0)], data[(sample[0], 1)]);
        let (x2, y2) = (data[(sample[1], 0)], data[(sample[1], 1)]);

        let dx = x2 - x1;
        let dy = y2 - y1;
        if dx * dx + dy * dy < COINCIDENT_DIST_SQ {
            return Line::Degenerate;
        }
        if dx.abs() < VERTICAL_DX {
            return Line::vertical(0.5 * (x1 + x2));
        }

        let slope = dy / dx;
        let intercept = y1 - slope * x1;
        if !slope.is_finite() || !intercept.is_finite() {
            return Line::vertical(0.5 * (x1 + x2));
        }
        Line::sloped(slope, intercept)
    }

    fn refit(&self, data: &DataMatrix, inliers: &[usize]) -> Self::Model {
        if inliers.len() < self.sample_size() || data.ncols() < 2 {
            return Line::Degenerate;
        }

        let (mut sum_x, mut sum_y, mut sum_xx, mut sum_xy) = (0.0, 0.0, 0.0, 0.0);
        for &i in inliers {
            let x = data[(i, 0)];
            let y = data[(i, 1)];
            sum_x += x;
            sum_y += y;
            sum_xx += x * x;
            sum_xy += x * y;
        }
        let n = inliers.len() as f64;

        let denom = n * sum_xx - sum_x * sum_x;
        if denom.abs() <= SINGULAR_REL * (n * sum_xx).max(1.0) {
            // All x-coordinates coincide.
            let x = sum_x / n;
            return if x.is_finite() {
                Line::vertical(x)
            } else {
                Line::Degenerate
            };
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denom;
        let intercept = (sum_y - slope * sum_x) / n;
        if !slope.is_finite() || !intercept.is_finite() {
            return Line::Degenerate;
        }
        Line::sloped(slope, intercept)
    }
}
