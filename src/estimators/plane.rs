//! Plane estimator for 3D plane fitting.

use crate::core::Estimator;
use crate::estimators::has_distinct_indices;
use crate::models::{Plane, MIN_NORMAL_NORM};
use crate::types::{point3, DataMatrix};
use nalgebra::{DMatrix, Point3, Vector3, SVD};

/// Ratio between the middle and largest singular value below which the
/// consensus set is treated as collinear.
const COLLINEAR_REL: f64 = 1e-9;

/// Plane estimator for 3D plane fitting.
///
/// Minimal samples are three non-collinear points. The refit is a total least
/// squares fit: the normal is the right singular vector of the centered
/// consensus set with the smallest singular value.
pub struct PlaneEstimator;

impl Default for PlaneEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaneEstimator {
    pub fn new() -> Self {
        Self
    }
}

/// Normal of the triangle `p1 p2 p3` (unnormalized).
fn triangle_normal(p1: &Point3<f64>, p2: &Point3<f64>, p3: &Point3<f64>) -> Vector3<f64> {
    (p2 - p1).cross(&(p3 - p1))
}

/// Flip `normal` so that `normal . centroid <= 0`.
///
/// Planes through the origin are disambiguated by making the largest
/// component positive.
fn orient_normal(normal: Vector3<f64>, centroid: &Point3<f64>) -> Vector3<f64> {
    let dot = normal.dot(&centroid.coords);
    let eps = 1e-12 * centroid.coords.norm().max(1.0);
    if dot > eps {
        return -normal;
    }
    if dot.abs() <= eps && normal[normal.iamax()] < 0.0 {
        return -normal;
    }
    normal
}

impl Estimator for PlaneEstimator {
    type Model = Plane;

    fn sample_size(&self) -> usize {
        3
    }

    fn is_valid_sample(&self, data: &DataMatrix, sample: &[usize]) -> bool {
        if sample.len() < self.sample_size() || data.ncols() < 3 {
            return false;
        }
        if !has_distinct_indices(sample) || sample.iter().any(|&i| i >= data.nrows()) {
            return false;
        }
        let normal = triangle_normal(
            &point3(data, sample[0]),
            &point3(data, sample[1]),
            &point3(data, sample[2]),
        );
        normal.norm() >= MIN_NORMAL_NORM
    }

    fn estimate_model(&self, data: &DataMatrix, sample: &[usize]) -> Self::Model {
        if sample.len() < self.sample_size() || data.ncols() < 3 {
            return Plane::default();
        }
        let p1 = point3(data, sample[0]);
        let normal = triangle_normal(&p1, &point3(data, sample[1]), &point3(data, sample[2]));
        if normal.norm() < MIN_NORMAL_NORM {
            return Plane::default();
        }
        Plane::from_normal_and_point(normal, &p1)
    }

    fn refit(&self, data: &DataMatrix, inliers: &[usize]) -> Self::Model {
        if inliers.len() < self.sample_size() || data.ncols() < 3 {
            return Plane::default();
        }

        let n = inliers.len();
        let centroid = inliers
            .iter()
            .fold(Vector3::zeros(), |acc, &i| acc + point3(data, i).coords)
            / n as f64;
        let centroid = Point3::from(centroid);

        let mut centered = DMatrix::<f64>::zeros(n, 3);
        for (row, &i) in inliers.iter().enumerate() {
            let p = point3(data, i) - centroid;
            centered[(row, 0)] = p.x;
            centered[(row, 1)] = p.y;
            centered[(row, 2)] = p.z;
        }

        let svd = SVD::new(centered, false, true);
        let Some(v_t) = svd.v_t else {
            log::debug!("plane refit: SVD did not produce V^T");
            return Plane::default();
        };

        let sv = &svd.singular_values;
        let mut order: Vec<usize> = (0..sv.len()).collect();
        order.sort_by(|&a, &b| sv[a].total_cmp(&sv[b]));
        if order.len() < 3 {
            return Plane::default();
        }
        let (smallest, middle, largest) = (order[0], order[1], order[2]);
        if !(sv[largest] > 0.0) || sv[middle] <= COLLINEAR_REL * sv[largest] {
            // Coincident or collinear consensus set.
            return Plane::default();
        }

        let row = v_t.row(smallest);
        let normal = orient_normal(Vector3::new(row[0], row[1], row[2]), &centroid);
        Plane::from_normal_and_point(normal, &centroid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Model;
    use crate::types::data_from_points3;
    use approx::assert_abs_diff_eq;

    fn reference_inliers() -> DataMatrix {
        // 2x + 0.5y - z + 1 = 0
        data_from_points3(&[
            [1.0, 1.0, 3.5],
            [2.0, 1.0, 5.5],
            [1.0, 2.0, 4.0],
            [3.0, 2.0, 8.0],
            [0.0, 0.0, 1.0],
            [1.5, 0.5, 4.25],
            [0.5, 1.5, 2.75],
        ])
    }

    fn true_normal() -> Vector3<f64> {
        Vector3::new(2.0, 0.5, -1.0).normalize()
    }

    #[test]
    fn three_points_define_unit_normal() {
        let data = reference_inliers();
        let plane = PlaneEstimator::new().estimate_model(&data, &[0, 1, 2]);
        assert!(plane.is_valid());
        assert_abs_diff_eq!(plane.normal.norm(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(plane.normal.dot(&true_normal()).abs(), 1.0, epsilon = 1e-12);
        for i in 0..data.nrows() {
            assert!(plane.residual(&data, i) < 1e-9);
        }
    }

    #[test]
    fn collinear_sample_is_rejected() {
        let data = data_from_points3(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]]);
        let estimator = PlaneEstimator::new();
        assert!(!estimator.is_valid_sample(&data, &[0, 1, 2]));
        assert!(!estimator.is_valid_sample(&data, &[0, 0, 1]));
        let plane = estimator.estimate_model(&data, &[0, 1, 2]);
        assert!(!plane.is_valid());
        assert_eq!(plane, Plane::default());
    }

    #[test]
    fn refit_recovers_plane_and_orients_normal() {
        let data = reference_inliers();
        let rows: Vec<usize> = (0..data.nrows()).collect();
        let plane = PlaneEstimator::new().refit(&data, &rows);

        assert!(plane.is_valid());
        assert_abs_diff_eq!(plane.normal.dot(&true_normal()).abs(), 1.0, epsilon = 1e-9);
        // normal . centroid <= 0 means d >= 0.
        assert!(plane.d >= 0.0);
        for &i in &rows {
            assert!(plane.residual(&data, i) < 1e-9);
        }
    }

    #[test]
    fn refit_is_stable_across_runs() {
        let data = reference_inliers();
        let rows: Vec<usize> = (0..data.nrows()).collect();
        let estimator = PlaneEstimator::new();
        let a = estimator.refit(&data, &rows);
        let b = estimator.refit(&data, &rows);
        assert_eq!(a, b);

        let mut reversed = rows.clone();
        reversed.reverse();
        let c = estimator.refit(&data, &reversed);
        assert_abs_diff_eq!(a.normal.dot(&c.normal), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn refit_of_degenerate_sets_is_invalid() {
        let estimator = PlaneEstimator::new();
        let collinear = data_from_points3(&[
            [0.0, 0.0, 0.0],
            [1.0, 2.0, 3.0],
            [2.0, 4.0, 6.0],
            [3.0, 6.0, 9.0],
        ]);
        assert!(!estimator.refit(&collinear, &[0, 1, 2, 3]).is_valid());

        let coincident = data_from_points3(&[[1.0, 1.0, 1.0]; 4]);
        assert!(!estimator.refit(&coincident, &[0, 1, 2, 3]).is_valid());

        assert!(!estimator.refit(&reference_inliers(), &[0, 1]).is_valid());
    }

    #[test]
    fn refit_does_not_increase_squared_error() {
        let data = data_from_points3(&[
            [1.0, 1.0, 3.5],
            [2.0, 1.0, 5.5],
            [1.0, 2.0, 4.0],
            [3.0, 2.0, 8.0],
            [0.0, 0.0, 1.0],
            [2.5, 1.5, 7.25],
            [1.5, 0.5, 4.25],
            [0.5, 1.5, 2.75],
        ]);
        let rows: Vec<usize> = (0..data.nrows()).collect();
        let estimator = PlaneEstimator::new();
        let refit = estimator.refit(&data, &rows);
        let sum_sq = |plane: &Plane| -> f64 {
            rows.iter().map(|&i| plane.residual(&data, i).powi(2)).sum()
        };

        let minimal = estimator.estimate_model(&data, &[0, 1, 2]);
        assert!(sum_sq(&refit) <= sum_sq(&minimal) + 1e-12);
        let minimal = estimator.estimate_model(&data, &[5, 3, 7]);
        assert!(sum_sq(&refit) <= sum_sq(&minimal) + 1e-12);
    }

    #[test]
    fn refit_beats_minimal_models_on_reference_inliers() {
        // Row 5 sits about 0.22 off the plane through the other seven.
        let data = data_from_points3(&[
            [1.0, 1.0, 3.5],
            [2.0, 1.0, 5.5],
            [1.0, 2.0, 4.0],
            [3.0, 2.0, 8.0],
            [0.0, 0.0, 1.0],
            [2.5, 1.5, 7.25],
            [1.5, 0.5, 4.25],
            [0.5, 1.5, 2.75],
        ]);
        let rows: Vec<usize> = (0..data.nrows()).collect();
        let estimator = PlaneEstimator::new();
        let refit = estimator.refit(&data, &rows);

        let residuals = |plane: &Plane| -> Vec<f64> {
            rows.iter().map(|&i| plane.residual(&data, i)).collect()
        };
        let mean = |r: &[f64]| r.iter().sum::<f64>() / r.len() as f64;
        let max = |r: &[f64]| r.iter().copied().fold(0.0, f64::max);

        let refit_residuals = residuals(&refit);
        assert!(max(&refit_residuals) < 0.4);
        assert_abs_diff_eq!(
            crate::scoring::mean_inlier_error(&data, &refit, 0.4),
            mean(&refit_residuals),
            epsilon = 1e-12
        );

        let mut compared = 0;
        for a in 0..rows.len() {
            for b in (a + 1)..rows.len() {
                for c in (b + 1)..rows.len() {
                    let sample = [a, b, c];
                    if !estimator.is_valid_sample(&data, &sample) {
                        continue;
                    }
                    let minimal = residuals(&estimator.estimate_model(&data, &sample));
                    assert!(max(&refit_residuals) <= max(&minimal));
                    if sample.contains(&5) {
                        assert!(mean(&refit_residuals) <= mean(&minimal));
                    }
                    compared += 1;
                }
            }
        }
        assert_eq!(compared, 54);
    }
}
