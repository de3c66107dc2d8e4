//! Cubic smoothing spline over log-moneyness.
//!
//! Fits the natural cubic spline `g` minimizing
//!
//! ```text
//! p · Σ (yᵢ − g(xᵢ))²  +  (1 − p) · ∫ g''(u)² du
//! ```
//!
//! where `u` is `x` rescaled to \[0, 1\] so the tightness `p` does not depend
//! on the strike range of the instrument. `p = 1` interpolates the data,
//! smaller `p` trades fidelity for smoothness.
//!
//! # Algorithm
//!
//! The fitted knot values come from Reinsch's formulation: with `Q` the
//! second-difference operator and `R` the tridiagonal Gram matrix,
//! `(R + α QᵀQ) γ = Qᵀy`, `g = y − α Q γ`, `α = (1 − p) / p`. The banded
//! system is small and is solved by Cholesky. The curve itself is then the
//! natural cubic spline through `(xᵢ, gᵢ)`, built with the Thomas algorithm.
//! Evaluation uses binary search + Horner form; flat extrapolation outside
//! the knot range prevents divergence.
//!
//! # References
//! - Reinsch, C.H. "Smoothing by Spline Functions" (1967)
//! - Green, P.J. & Silverman, B.W. "Nonparametric Regression and Generalized
//!   Linear Models" (1994), ch. 2

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{self, SurfaceError};
use crate::validate::validate_in_range;

/// Minimum knots for a cubic fit.
pub const MIN_SPLINE_POINTS: usize = 4;

/// Coefficients for one cubic polynomial interval.
///
/// On interval \[xᵢ, xᵢ₊₁\], the spline is:
/// `S(x) = a + b·(x - xᵢ) + c·(x - xᵢ)² + d·(x - xᵢ)³`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SplineCoeff {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

/// Fitted cubic smoothing spline.
///
/// ```
/// use ivsurf::smile::SmoothingSpline;
///
/// let x = vec![-0.2, -0.1, 0.0, 0.1, 0.2];
/// let y = vec![0.28, 0.23, 0.20, 0.21, 0.24];
/// let spline = SmoothingSpline::fit(&x, &y, 0.9999).unwrap();
/// assert!((spline.eval(0.0) - 0.20).abs() < 0.01);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    coeffs: Vec<SplineCoeff>,
    tightness: f64,
}

impl SmoothingSpline {
    /// Fit a smoothing spline through `(x, y)`.
    ///
    /// # Arguments
    /// * `x` — Strictly increasing abscissae (at least 4)
    /// * `y` — Finite observations, same length as `x`
    /// * `tightness` — `p` in (0, 1]
    ///
    /// # Errors
    /// Returns [`SurfaceError::InvalidInput`] for too few points, mismatched
    /// lengths, non-finite data, non-increasing `x` or `p` out of range.
    /// Returns [`SurfaceError::NumericalError`] if the Reinsch system is not
    /// positive definite.
    pub fn fit(x: &[f64], y: &[f64], tightness: f64) -> error::Result<Self> {
        validate_in_range(tightness, f64::MIN_POSITIVE, 1.0, "tightness")?;
        if x.len() != y.len() {
            return Err(SurfaceError::InvalidInput {
                message: format!(
                    "x and y must have the same length, got {} and {}",
                    x.len(),
                    y.len()
                ),
            });
        }
        if x.len() < MIN_SPLINE_POINTS {
            return Err(SurfaceError::InvalidInput {
                message: format!(
                    "smoothing spline requires at least {MIN_SPLINE_POINTS} points, got {}",
                    x.len()
                ),
            });
        }
        if let Some(v) = x.iter().chain(y).find(|v| !v.is_finite()) {
            return Err(SurfaceError::InvalidInput {
                message: format!("spline data must be finite, got {v}"),
            });
        }
        for (i, w) in x.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(SurfaceError::InvalidInput {
                    message: format!(
                        "x must be strictly increasing, but x[{}]={} >= x[{}]={}",
                        i,
                        w[0],
                        i + 1,
                        w[1]
                    ),
                });
            }
        }

        let values = reinsch_values(x, y, tightness)?;
        let coeffs = build_spline_coefficients(x, &values);

        Ok(Self {
            knots: x.to_vec(),
            values,
            coeffs,
            tightness,
        })
    }

    /// Natural cubic spline passing exactly through the data.
    pub fn interpolate(x: &[f64], y: &[f64]) -> error::Result<Self> {
        Self::fit(x, y, 1.0)
    }

    /// Evaluate the spline at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.knots.len();
        if n == 0 || self.values.len() != n || self.coeffs.len() + 1 != n {
            return f64::NAN;
        }
        if x <= self.knots[0] {
            return self.values[0];
        }
        if x >= self.knots[n - 1] {
            return self.values[n - 1];
        }
        let i = self.knots.partition_point(|&k| k < x) - 1;
        let dx = x - self.knots[i];
        let c = &self.coeffs[i];
        c.a + dx * (c.b + dx * (c.c + dx * c.d))
    }

    /// Evaluate at `n` evenly spaced points spanning the knot range,
    /// endpoints included.
    pub fn sample(&self, n: usize) -> Vec<(f64, f64)> {
        let (Some(&lo), Some(&hi)) = (self.knots.first(), self.knots.last()) else {
            return Vec::new();
        };
        linspace(lo, hi, n)
            .into_iter()
            .map(|x| (x, self.eval(x)))
            .collect()
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Smoothed values at the knots.
    pub fn fitted_values(&self) -> &[f64] {
        &self.values
    }

    pub fn tightness(&self) -> f64 {
        self.tightness
    }
}

/// `n` evenly spaced points from `lo` to `hi` inclusive.
pub(crate) fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

/// Knot values of the smoothing spline via Reinsch's algorithm.
fn reinsch_values(x: &[f64], y: &[f64], tightness: f64) -> error::Result<Vec<f64>> {
    let alpha = (1.0 - tightness) / tightness;
    if alpha == 0.0 {
        return Ok(y.to_vec());
    }

    let n = x.len();
    let m = n - 2;
    let span = x[n - 1] - x[0];
    let h: Vec<f64> = x.windows(2).map(|w| (w[1] - w[0]) / span).collect();

    // Q (n × m): second-difference operator on the unit interval.
    let mut q = DMatrix::<f64>::zeros(n, m);
    for j in 0..m {
        let i = j + 1;
        q[(i - 1, j)] = 1.0 / h[i - 1];
        q[(i, j)] = -1.0 / h[i - 1] - 1.0 / h[i];
        q[(i + 1, j)] = 1.0 / h[i];
    }

    // R (m × m): symmetric tridiagonal.
    let mut r = DMatrix::<f64>::zeros(m, m);
    for j in 0..m {
        let i = j + 1;
        r[(j, j)] = (h[i - 1] + h[i]) / 3.0;
        if j + 1 < m {
            r[(j, j + 1)] = h[i] / 6.0;
            r[(j + 1, j)] = h[i] / 6.0;
        }
    }

    let y_vec = DVector::from_column_slice(y);
    let system = r + q.transpose() * &q * alpha;
    let rhs = q.transpose() * &y_vec;
    let gamma = system
        .cholesky()
        .ok_or_else(|| SurfaceError::NumericalError {
            message: "smoothing spline system is not positive definite".into(),
        })?
        .solve(&rhs);

    let fitted = y_vec - q * gamma * alpha;
    if fitted.iter().any(|v| !v.is_finite()) {
        return Err(SurfaceError::NumericalError {
            message: "smoothing spline produced non-finite values".into(),
        });
    }
    Ok(fitted.iter().copied().collect())
}

/// Solve the natural cubic spline tridiagonal system and return
/// per-interval coefficients.
///
/// Uses the Thomas algorithm: O(n) forward elimination + back substitution.
fn build_spline_coefficients(x: &[f64], y: &[f64]) -> Vec<SplineCoeff> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    // Second-derivative coefficients with c[0] = c[n-1] = 0 (natural).
    let mut c = vec![0.0; n];

    if n > 2 {
        let m = n - 2;
        let mut diag = vec![0.0; m];
        let mut rhs = vec![0.0; m];

        for j in 0..m {
            let i = j + 1;
            diag[j] = 2.0 * (h[i - 1] + h[i]);
            rhs[j] = 3.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }

        // Forward sweep
        for j in 1..m {
            let w = h[j] / diag[j - 1];
            diag[j] -= w * h[j];
            rhs[j] -= w * rhs[j - 1];
        }

        // Back substitution
        c[m] = rhs[m - 1] / diag[m - 1];
        for j in (0..m - 1).rev() {
            let i = j + 1;
            c[i] = (rhs[j] - h[j + 1] * c[i + 1]) / diag[j];
        }
    }

    (0..n - 1)
        .map(|i| SplineCoeff {
            a: y[i],
            b: (y[i + 1] - y[i]) / h[i] - h[i] * (2.0 * c[i] + c[i + 1]) / 3.0,
            c: c[i],
            d: (c[i + 1] - c[i]) / (3.0 * h[i]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn smile_x() -> Vec<f64> {
        (0..25).map(|i| -0.3 + 0.025 * i as f64).collect()
    }

    // --- Constructor validation tests ---

    #[test]
    fn rejects_fewer_than_4_points() {
        let result = SmoothingSpline::fit(&[0.0, 0.1, 0.2], &[0.2, 0.2, 0.2], 0.9);
        assert!(matches!(result, Err(SurfaceError::InvalidInput { .. })));
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let result = SmoothingSpline::fit(&[0.0, 0.1, 0.2, 0.3], &[0.2, 0.2, 0.2], 0.9);
        assert!(matches!(result, Err(SurfaceError::InvalidInput { .. })));
    }

    #[test]
    fn rejects_duplicate_x() {
        let result =
            SmoothingSpline::fit(&[0.0, 0.1, 0.1, 0.3], &[0.2, 0.21, 0.22, 0.2], 0.9);
        assert!(matches!(result, Err(SurfaceError::InvalidInput { .. })));
    }

    #[test]
    fn rejects_nan_observation() {
        let result =
            SmoothingSpline::fit(&[0.0, 0.1, 0.2, 0.3], &[0.2, f64::NAN, 0.22, 0.2], 0.9);
        assert!(matches!(result, Err(SurfaceError::InvalidInput { .. })));
    }

    #[test]
    fn rejects_tightness_out_of_range() {
        let x = [0.0, 0.1, 0.2, 0.3];
        let y = [0.2, 0.21, 0.22, 0.2];
        assert!(SmoothingSpline::fit(&x, &y, 0.0).is_err());
        assert!(SmoothingSpline::fit(&x, &y, 1.01).is_err());
    }

    // --- Fit behaviour ---

    #[test]
    fn unit_tightness_interpolates_knots() {
        let x = vec![-0.2, -0.1, 0.0, 0.1, 0.2];
        let y = vec![0.28, 0.23, 0.20, 0.21, 0.24];
        let spline = SmoothingSpline::interpolate(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(&y) {
            assert_abs_diff_eq!(spline.eval(*xi), *yi, epsilon = 1e-14);
        }
    }

    #[test]
    fn recovers_linear_function_at_any_tightness() {
        let f = |x: f64| 0.2 - 0.1 * x;
        let x = smile_x();
        let y: Vec<f64> = x.iter().map(|&v| f(v)).collect();
        for p in [0.5, 0.99, 1.0] {
            let spline = SmoothingSpline::fit(&x, &y, p).unwrap();
            for v in [-0.27, -0.01, 0.13, 0.29] {
                assert_abs_diff_eq!(spline.eval(v), f(v), epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn damps_alternating_noise() {
        let x = smile_x();
        let truth: Vec<f64> = x.iter().map(|&k| 0.2 + 0.3 * k * k).collect();
        let noisy: Vec<f64> = truth
            .iter()
            .enumerate()
            .map(|(i, t)| if i % 2 == 0 { t - 0.005 } else { t + 0.005 })
            .collect();

        let spline = SmoothingSpline::fit(&x, &noisy, 0.9999).unwrap();
        let max_dev = spline
            .fitted_values()
            .iter()
            .zip(&truth)
            .map(|(g, t)| (g - t).abs())
            .fold(0.0, f64::max);
        assert!(max_dev < 0.004, "smoothed deviation {max_dev} should beat raw 0.005");
    }

    #[test]
    fn looser_tightness_is_smoother() {
        let x = smile_x();
        let noisy: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, &k)| 0.2 + 0.3 * k * k + if i % 2 == 0 { -0.004 } else { 0.004 })
            .collect();
        let roughness = |s: &SmoothingSpline| {
            s.fitted_values()
                .windows(3)
                .map(|w| (w[0] - 2.0 * w[1] + w[2]).abs())
                .sum::<f64>()
        };
        let tight = SmoothingSpline::fit(&x, &noisy, 0.999_99).unwrap();
        let loose = SmoothingSpline::fit(&x, &noisy, 0.99).unwrap();
        assert!(roughness(&loose) < roughness(&tight));
    }

    #[test]
    fn flat_extrapolation_outside_knots() {
        let x = vec![-0.2, -0.1, 0.0, 0.1, 0.2];
        let y = vec![0.28, 0.23, 0.20, 0.21, 0.24];
        let spline = SmoothingSpline::interpolate(&x, &y).unwrap();
        assert_abs_diff_eq!(spline.eval(-1.0), 0.28, epsilon = 1e-14);
        assert_abs_diff_eq!(spline.eval(1.0), 0.24, epsilon = 1e-14);
    }

    #[test]
    fn sample_spans_knot_range() {
        let x = smile_x();
        let y: Vec<f64> = x.iter().map(|&k| 0.2 + 0.3 * k * k).collect();
        let spline = SmoothingSpline::fit(&x, &y, 0.9999).unwrap();
        let samples = spline.sample(50);
        assert_eq!(samples.len(), 50);
        assert_eq!(samples[0].0, x[0]);
        assert_eq!(samples[49].0, x[x.len() - 1]);
        assert!(samples.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn linspace_edges() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.3, 1.0, 1), vec![0.3]);
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn serde_round_trip() {
        let x = vec![-0.2, -0.1, 0.0, 0.1, 0.2];
        let y = vec![0.28, 0.23, 0.20, 0.21, 0.24];
        let spline = SmoothingSpline::fit(&x, &y, 0.999).unwrap();
        let json = serde_json::to_string(&spline).unwrap();
        let back: SmoothingSpline = serde_json::from_str(&json).unwrap();
        assert_abs_diff_eq!(back.eval(0.05), spline.eval(0.05), epsilon = 1e-15);
    }

    #[test]
    fn inconsistent_state_evaluates_to_nan() {
        let x = vec![-0.2, -0.1, 0.0, 0.1, 0.2];
        let y = vec![0.28, 0.23, 0.20, 0.21, 0.24];
        let spline = SmoothingSpline::fit(&x, &y, 0.999).unwrap();
        let mut json: serde_json::Value = serde_json::to_value(&spline).unwrap();
        json["values"] = serde_json::json!([]);
        let broken: SmoothingSpline = serde_json::from_value(json).unwrap();
        for x in [-1.0, 0.05, 1.0] {
            assert!(broken.eval(x).is_nan());
        }
    }
}
