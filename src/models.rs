//! Geometric models fitted by the RANSAC pipeline.
//!
//! Both models report their error against a single point-store row and expose
//! an explicit invalid state (`Default`) instead of producing NaNs, so a model
//! built from a degenerate sample can never win a consensus comparison.

use crate::core::Model;
use crate::types::DataMatrix;
use nalgebra::{Point3, Vector3};

/// Distance reported for invalid models. Larger than any tolerance in use.
pub const INVALID_DISTANCE: f64 = 1e10;

/// Minimum normal magnitude for a plane to be considered valid.
pub const MIN_NORMAL_NORM: f64 = 1e-9;

/// 2-D line.
///
/// Non-vertical lines are stored in slope-intercept form and measure error
/// along the y axis. Vertical lines get their own variant rather than a huge
/// finite slope.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Line {
    /// `y = slope * x + intercept`.
    Sloped { slope: f64, intercept: f64 },
    /// `X = x`.
    Vertical { x: f64 },
    /// No line could be determined (coincident points, empty refit).
    #[default]
    Degenerate,
}

impl Line {
    pub fn sloped(slope: f64, intercept: f64) -> Self {
        Line::Sloped { slope, intercept }
    }

    pub fn vertical(x: f64) -> Self {
        Line::Vertical { x }
    }

    /// Slope and intercept, if the line is neither vertical nor degenerate.
    pub fn to_slope_intercept(&self) -> Option<(f64, f64)> {
        match *self {
            Line::Sloped { slope, intercept } => Some((slope, intercept)),
            _ => None,
        }
    }

    /// Error of an arbitrary point `(x, y)`.
    pub fn distance(&self, x: f64, y: f64) -> f64 {
        match *self {
            Line::Sloped { slope, intercept } => (slope * x + intercept - y).abs(),
            Line::Vertical { x: x0 } => (x - x0).abs(),
            Line::Degenerate => INVALID_DISTANCE,
        }
    }
}

impl Model for Line {
    fn residual(&self, data: &DataMatrix, row: usize) -> f64 {
        self.distance(data[(row, 0)], data[(row, 1)])
    }

    fn is_valid(&self) -> bool {
        match *self {
            Line::Sloped { slope, intercept } => slope.is_finite() && intercept.is_finite(),
            Line::Vertical { x } => x.is_finite(),
            Line::Degenerate => false,
        }
    }
}

/// Plane `a*x + b*y + c*z + d = 0` with a unit normal `(a, b, c)`.
///
/// The default plane has a zero normal and is invalid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub d: f64,
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vector3::zeros(),
            d: 0.0,
        }
    }
}

impl Plane {
    /// Plane through `point` with the given normal direction.
    ///
    /// The normal is normalized here; a negligible or non-finite normal
    /// yields the invalid default plane.
    pub fn from_normal_and_point(normal: Vector3<f64>, point: &Point3<f64>) -> Self {
        let norm = normal.norm();
        if !norm.is_finite() || norm <= MIN_NORMAL_NORM {
            return Self::default();
        }
        let normal = normal / norm;
        let d = -normal.dot(&point.coords);
        if !d.is_finite() {
            return Self::default();
        }
        Self { normal, d }
    }

    /// Coefficients `[a, b, c, d]`.
    pub fn coefficients(&self) -> [f64; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.d]
    }

    /// Perpendicular distance of an arbitrary point.
    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        if self.normal.norm_squared() < MIN_NORMAL_NORM * MIN_NORMAL_NORM {
            return INVALID_DISTANCE;
        }
        (self.normal.dot(&point.coords) + self.d).abs()
    }
}

impl Model for Plane {
    fn residual(&self, data: &DataMatrix, row: usize) -> f64 {
        self.distance(&Point3::new(data[(row, 0)], data[(row, 1)], data[(row, 2)]))
    }

    fn is_valid(&self) -> bool {
        self.normal.iter().all(|v| v.is_finite())
            && self.d.is_finite()
            && self.normal.norm() > MIN_NORMAL_NORM
    }
}
