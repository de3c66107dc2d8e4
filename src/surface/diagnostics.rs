//! Coverage and fit-quality diagnostics for a point cloud.

use serde::{Deserialize, Serialize};

use crate::error::{self, SurfaceError};
use crate::types::SurfacePoint;

/// How the surface points are spread around the money.
///
/// A surface built from puts only (or calls only) extrapolates the other
/// wing; these counts make that visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoverageDiagnostics {
    pub total: usize,
    /// Points with `x < 0` (below spot).
    pub negative: usize,
    /// Points with `x > 0` (above spot).
    pub positive: usize,
    /// Points with `|x| <= atm_band`.
    pub atm_band: usize,
}

impl CoverageDiagnostics {
    pub fn from_points(points: &[SurfacePoint], atm_band: f64) -> Self {
        points.iter().fold(
            Self {
                total: points.len(),
                ..Self::default()
            },
            |mut acc, p| {
                if p.x < 0.0 {
                    acc.negative += 1;
                }
                if p.x > 0.0 {
                    acc.positive += 1;
                }
                if p.x.abs() <= atm_band {
                    acc.atm_band += 1;
                }
                acc
            },
        )
    }

    /// True if both wings carry at least one point.
    pub fn is_two_sided(&self) -> bool {
        self.negative > 0 && self.positive > 0
    }
}

/// Variance-weighted mean absolute vol error `Σ wᵢ |σ̂ᵢ − σᵢ| / Σ wᵢ` with
/// `wᵢ = σᵢ² yᵢ`.
///
/// Points whose model vol is masked, or whose observation is not finite, are
/// skipped.
///
/// # Errors
/// Returns [`SurfaceError::NumericalError`] if no point carries positive
/// weight.
pub(crate) fn weighted_abs_error(points: &[SurfacePoint], fitted: &[Option<f64>]) -> error::Result<f64> {
    let (num, den) = points
        .iter()
        .zip(fitted)
        .filter_map(|(p, fit)| {
            let fit = (*fit)?;
            let w = p.z * p.z * p.y;
            (w.is_finite() && w > 0.0 && fit.is_finite()).then_some((w * (fit - p.z).abs(), w))
        })
        .fold((0.0, 0.0), |(n, d), (wn, w)| (n + wn, d + w));

    if den <= 0.0 {
        return Err(SurfaceError::NumericalError {
            message: format!(
                "no usable points for fit error ({} points, {} masked)",
                points.len(),
                fitted.iter().filter(|f| f.is_none()).count()
            ),
        });
    }
    Ok(num / den)
}
