//! Cubic spline interpolation of tabulated data
use itertools::Itertools;
use nalgebra::{DMatrix, DVector};

use crate::error::Error;

/// Minimal number of points for cubic interpolation
pub const MIN_CUBIC_POINTS: usize = 4;

/// [CubicSpline] interpolates tabulated `y = f(x)` values with
/// piecewise cubic polynomials, using not-a-knot end conditions.
/// It passes through every tabulated point and reproduces any cubic
/// polynomial exactly. It never extrapolates.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivative at each knot
    m: Vec<f64>,
}

impl CubicSpline {
    /// Builds a [CubicSpline] from tabulated values.
    /// `entity` is only used to describe possible errors.
    pub fn new(entity: &str, x: &[f64], y: &[f64]) -> Result<Self, Error> {
        if x.len() != y.len() {
            return Err(Error::ShapeMismatch {
                expected: x.len(),
                found: y.len(),
            });
        }

        let n = x.len();

        if n < MIN_CUBIC_POINTS {
            return Err(Error::InsufficientData {
                entity: entity.to_string(),
                points: n,
            });
        }

        if !x.iter().tuple_windows().all(|(a, b)| b > a) {
            return Err(Error::NonMonotonic(entity.to_string()));
        }

        let h = x
            .iter()
            .tuple_windows()
            .map(|(a, b)| b - a)
            .collect::<Vec<_>>();

        let mut a = DMatrix::<f64>::zeros(n, n);
        let mut b = DVector::<f64>::zeros(n);

        // third derivative continuity at x[1]
        a[(0, 0)] = h[1];
        a[(0, 1)] = -(h[0] + h[1]);
        a[(0, 2)] = h[0];

        for i in 1..n - 1 {
            a[(i, i - 1)] = h[i - 1];
            a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            a[(i, i + 1)] = h[i];
            b[i] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }

        // third derivative continuity at x[n-2]
        a[(n - 1, n - 3)] = h[n - 2];
        a[(n - 1, n - 2)] = -(h[n - 3] + h[n - 2]);
        a[(n - 1, n - 1)] = h[n - 3];

        let m = a
            .lu()
            .solve(&b)
            .ok_or_else(|| Error::NonMonotonic(entity.to_string()))?;

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m: m.iter().copied().collect(),
        })
    }

    /// Interpolation range
    pub fn range(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Evaluates the spline at `x`, which must lie within [Self::range].
    pub fn eval(&self, x: f64) -> Result<f64, Error> {
        let (min, max) = self.range();

        // also rejects NaN
        if !(x >= min && x <= max) {
            return Err(Error::Extrapolation { x, min, max });
        }

        let n = self.x.len();
        let i = self.x.partition_point(|xi| *xi <= x).clamp(1, n - 1) - 1;

        let h = self.x[i + 1] - self.x[i];
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        let (m0, m1) = (self.m[i], self.m[i + 1]);

        let t = x - self.x[i];
        let slope = (y1 - y0) / h - h * (2.0 * m0 + m1) / 6.0;

        Ok(y0 + slope * t + m0 / 2.0 * t.powi(2) + (m1 - m0) / 6.0 / h * t.powi(3))
    }
}
