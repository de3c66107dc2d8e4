//! Global implied-vol surface over (log-moneyness, year fraction).
//!
//! The smoothed per-expiry smiles are pooled into one scattered point cloud
//! and fitted in a single batch, in total-variance space, by a radial-basis
//! interpolant. Querying inverts total variance back to Black vol.
//!
//! - [`SurfaceBuilder`] — fits an [`RbfSurface`] to [`SurfacePoint`]s
//! - [`RbfInterpolant`] — the underlying 2-D scattered interpolant
//! - [`Grid`] / [`VolGrid`] — rectangular evaluation grids
//! - [`CoverageDiagnostics`] — wing and at-the-money coverage counts

pub mod builder;
pub mod diagnostics;
pub mod grid;
pub mod rbf;

pub use builder::SurfaceBuilder;
pub use diagnostics::CoverageDiagnostics;
pub use grid::{Grid, VolGrid};
pub use rbf::{RbfInterpolant, RbfKernel};

use serde::{Deserialize, Serialize};

use crate::error;
use crate::types::{SurfacePoint, Variance, Vol};

/// Floor on the year fraction when converting total variance back to vol.
pub const MIN_INVERSION_TENOR: f64 = 1e-6;

/// Black vol from total variance: `sqrt(max(w / max(y, 1e-6), 0))`.
///
/// Negative variance (an interpolation artifact in sparse regions) maps to
/// zero vol. A non-finite result is masked as `None`.
///
/// ```
/// use ivsurf::surface::vol_from_total_variance;
///
/// assert_eq!(vol_from_total_variance(0.01, 0.25), Some(0.2));
/// assert_eq!(vol_from_total_variance(-0.01, 0.25), Some(0.0));
/// assert_eq!(vol_from_total_variance(f64::NAN, 0.25), None);
/// ```
pub fn vol_from_total_variance(w: f64, y: f64) -> Option<f64> {
    let vol = (w / y.max(MIN_INVERSION_TENOR)).max(0.0).sqrt();
    // f64::max drops NaN operands, so check the input as well.
    (w.is_finite() && vol.is_finite()).then_some(vol)
}

/// A fitted implied-vol surface.
///
/// Implementations are immutable after construction and must be
/// `Send + Sync`; every query is a pure function of its arguments.
///
/// # Examples
///
/// ```
/// use ivsurf::surface::{SurfaceBuilder, VolSurface};
/// use ivsurf::types::SurfacePoint;
///
/// let points = [
///     SurfacePoint::new(-0.1, 0.25, 0.24),
///     SurfacePoint::new(0.0, 0.25, 0.20),
///     SurfacePoint::new(0.1, 0.25, 0.22),
///     SurfacePoint::new(0.0, 1.0, 0.21),
/// ];
/// let surface = SurfaceBuilder::new().add_points(&points).build()?;
///
/// let vol = surface.black_vol(0.0, 0.25).unwrap();
/// assert!((vol.0 - 0.20).abs() < 1e-2);
/// # Ok::<(), ivsurf::SurfaceError>(())
/// ```
pub trait VolSurface: Send + Sync + std::fmt::Debug {
    /// Model total variance `w(x, y)` at log-moneyness `x`, year fraction `y`.
    fn total_variance(&self, x: f64, y: f64) -> Variance;

    /// Black vol at `(x, y)`, or `None` where the inversion is masked.
    fn black_vol(&self, x: f64, y: f64) -> Option<Vol> {
        vol_from_total_variance(self.total_variance(x, y).0, y).map(Vol)
    }

    /// Vols at arbitrary `(x, y)` points, in input order.
    fn evaluate_at(&self, points: &[(f64, f64)]) -> Vec<Option<f64>> {
        points
            .iter()
            .map(|&(x, y)| self.black_vol(x, y).map(|v| v.0))
            .collect()
    }

    /// Vols at every node of `grid`.
    fn evaluate_grid(&self, grid: &Grid) -> VolGrid {
        let values: Vec<Option<f64>> = grid
            .nodes()
            .map(|(x, y)| self.black_vol(x, y).map(|v| v.0))
            .collect();

        #[cfg(feature = "logging")]
        tracing::debug!(
            nodes = values.len(),
            masked = values.iter().filter(|v| v.is_none()).count(),
            "surface grid evaluated"
        );

        VolGrid {
            x: grid.x().to_vec(),
            y: grid.y().to_vec(),
            values,
        }
    }

    /// Variance-weighted mean absolute vol error against observed points.
    ///
    /// # Errors
    /// Returns [`SurfaceError::NumericalError`](crate::SurfaceError::NumericalError)
    /// if every point is masked or carries zero weight.
    fn fit_error(&self, points: &[SurfacePoint]) -> error::Result<f64> {
        let fitted: Vec<Option<f64>> = points
            .iter()
            .map(|p| self.black_vol(p.x, p.y).map(|v| v.0))
            .collect();
        diagnostics::weighted_abs_error(points, &fitted)
    }
}

/// Surface backed by a radial-basis interpolant of total variance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbfSurface {
    interpolant: RbfInterpolant,
}

impl RbfSurface {
    pub(crate) fn new(interpolant: RbfInterpolant) -> Self {
        Self { interpolant }
    }

    pub fn interpolant(&self) -> &RbfInterpolant {
        &self.interpolant
    }
}

impl VolSurface for RbfSurface {
    fn total_variance(&self, x: f64, y: f64) -> Variance {
        Variance(self.interpolant.eval(x, y))
    }
}
