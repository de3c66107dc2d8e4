//! Scattered-data radial-basis interpolation in two dimensions.
//!
//! Given centers `pᵢ = (xᵢ, yᵢ)` and values `dᵢ`, the interpolant is
//!
//! ```text
//! s(p) = Σ cⱼ φ(‖p − pⱼ‖)
//! ```
//!
//! with weights from the dense system `(Φ − λI) c = d`, `Φᵢⱼ = φ(‖pᵢ − pⱼ‖)`.
//! `λ = 0` interpolates exactly; a small positive `λ` relaxes the fit at the
//! centers and flattens spikes between close, disagreeing points. The
//! system is not symmetric positive definite for the multiquadric kernel, so
//! it is solved by LU with partial pivoting.
//!
//! # References
//! - Hardy, R.L. "Multiquadric equations of topography and other irregular
//!   surfaces" (1971)
//! - Fasshauer, G.E. "Meshfree Approximation Methods with MATLAB" (2007)

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{self, SurfaceError};
use crate::validate::{validate_non_negative, validate_positive};

/// Radial kernel `φ(r)` with shape parameter `ε`.
///
/// ```
/// use ivsurf::surface::RbfKernel;
///
/// let k = RbfKernel::Multiquadric;
/// assert_eq!(k.apply(0.0, 0.5), 1.0);
/// assert!((k.apply(0.5, 0.5) - 2.0_f64.sqrt()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RbfKernel {
    /// `sqrt((r/ε)² + 1)`
    #[default]
    Multiquadric,
    /// `1 / sqrt((r/ε)² + 1)`
    InverseMultiquadric,
    /// `exp(−(r/ε)²)`
    Gaussian,
    /// `r² ln r`; ignores `ε`.
    ThinPlate,
}

impl RbfKernel {
    pub fn apply(self, r: f64, epsilon: f64) -> f64 {
        let s = r / epsilon;
        match self {
            RbfKernel::Multiquadric => (s * s + 1.0).sqrt(),
            RbfKernel::InverseMultiquadric => 1.0 / (s * s + 1.0).sqrt(),
            RbfKernel::Gaussian => (-(s * s)).exp(),
            RbfKernel::ThinPlate => {
                if r == 0.0 {
                    0.0
                } else {
                    r * r * r.ln()
                }
            }
        }
    }
}

/// Population variance (divides by `n`).
pub(crate) fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

/// Shape parameter scaled to the spread of the centers:
/// `ε = scale · sqrt(var(x) + var(y))`.
pub fn shape_parameter(centers: &[(f64, f64)], scale: f64) -> f64 {
    let (x, y): (Vec<f64>, Vec<f64>) = centers.iter().copied().unzip();
    scale * (population_variance(&x) + population_variance(&y)).sqrt()
}

/// A fitted radial-basis interpolant over the plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbfInterpolant {
    centers: Vec<(f64, f64)>,
    weights: Vec<f64>,
    kernel: RbfKernel,
    epsilon: f64,
    smoothing: f64,
}

impl RbfInterpolant {
    /// Solve for the kernel weights.
    ///
    /// # Errors
    /// Returns [`SurfaceError::InvalidInput`] for empty or mismatched input,
    /// non-finite coordinates, a non-positive `epsilon` or negative
    /// `smoothing`. Returns [`SurfaceError::NumericalError`] if the system is
    /// singular.
    pub fn fit(
        centers: &[(f64, f64)],
        values: &[f64],
        kernel: RbfKernel,
        epsilon: f64,
        smoothing: f64,
    ) -> error::Result<Self> {
        validate_positive(epsilon, "rbf epsilon")?;
        validate_non_negative(smoothing, "rbf smoothing")?;
        if centers.is_empty() || centers.len() != values.len() {
            return Err(SurfaceError::InvalidInput {
                message: format!(
                    "need matching non-empty centers and values, got {} and {}",
                    centers.len(),
                    values.len()
                ),
            });
        }
        if centers
            .iter()
            .any(|&(x, y)| !x.is_finite() || !y.is_finite())
            || values.iter().any(|v| !v.is_finite())
        {
            return Err(SurfaceError::InvalidInput {
                message: "rbf centers and values must be finite".into(),
            });
        }

        let n = centers.len();
        let phi = DMatrix::<f64>::from_fn(n, n, |i, j| {
            let r = distance(centers[i], centers[j]);
            let v = kernel.apply(r, epsilon);
            if i == j { v - smoothing } else { v }
        });
        let rhs = DVector::from_column_slice(values);

        let weights = phi
            .lu()
            .solve(&rhs)
            .ok_or_else(|| SurfaceError::NumericalError {
                message: format!("rbf system with {n} centers is singular"),
            })?;
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(SurfaceError::NumericalError {
                message: "rbf weights are not finite".into(),
            });
        }

        Ok(Self {
            centers: centers.to_vec(),
            weights: weights.iter().copied().collect(),
            kernel,
            epsilon,
            smoothing,
        })
    }

    /// Evaluate the interpolant at `(x, y)`.
    ///
    /// Returns NaN if the centers and weights disagree in length, which only
    /// a hand-edited serialized interpolant can produce.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        if self.centers.len() != self.weights.len() {
            return f64::NAN;
        }
        self.centers
            .iter()
            .zip(&self.weights)
            .map(|(&c, &w)| w * self.kernel.apply(distance((x, y), c), self.epsilon))
            .sum()
    }

    pub fn kernel(&self) -> RbfKernel {
        self.kernel
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}
