//! Core shared types.
//!
//! The point store is a dense `nalgebra` matrix with one row per point and one
//! column per coordinate (2 for line fitting, 3 for plane fitting). Estimators,
//! samplers, and scoring all address points by row index, so consensus sets are
//! plain index vectors in point-store order.

use nalgebra::{DMatrix, Point2, Point3};

/// Dynamic row-major view of the input points: `N x 2` or `N x 3`.
pub type DataMatrix = DMatrix<f64>;

/// Build a point store from 2-D coordinates.
pub fn data_from_points2(points: &[[f64; 2]]) -> DataMatrix {
    DataMatrix::from_fn(points.len(), 2, |r, c| points[r][c])
}

/// Build a point store from 3-D coordinates.
pub fn data_from_points3(points: &[[f64; 3]]) -> DataMatrix {
    DataMatrix::from_fn(points.len(), 3, |r, c| points[r][c])
}

/// Read row `idx` as a 2-D point.
#[inline]
pub fn point2(data: &DataMatrix, idx: usize) -> Point2<f64> {
    Point2::new(data[(idx, 0)], data[(idx, 1)])
}

/// Read row `idx` as a 3-D point.
#[inline]
pub fn point3(data: &DataMatrix, idx: usize) -> Point3<f64> {
    Point3::new(data[(idx, 0)], data[(idx, 1)], data[(idx, 2)])
}
