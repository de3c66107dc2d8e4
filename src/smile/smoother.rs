//! Per-expiry smile smoothing.
//!
//! Each [`ExpirySlice`] is smoothed on its own: a [`SmoothingSpline`] of
//! implied vol over log-moneyness, resampled at evenly spaced points. A
//! slice whose fit fails keeps its raw points, so one bad maturity never
//! removes itself from the surface.

use serde::{Deserialize, Serialize};

use crate::config::SurfaceConfig;
use crate::error::SurfaceError;
use crate::quotes::ExpirySlice;
use crate::smile::spline::SmoothingSpline;
use crate::types::SurfacePoint;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of smoothing one expiry slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SliceFit {
    /// Spline fit succeeded; `points` holds `smile_samples` resampled points.
    Smoothed {
        year_fraction: f64,
        points: Vec<SurfacePoint>,
    },
    /// Spline fit failed; `points` are the slice's raw quotes, unchanged.
    Fallback {
        year_fraction: f64,
        points: Vec<SurfacePoint>,
        reason: String,
    },
}

impl SliceFit {
    pub fn points(&self) -> &[SurfacePoint] {
        match self {
            SliceFit::Smoothed { points, .. } | SliceFit::Fallback { points, .. } => points,
        }
    }

    pub fn into_points(self) -> Vec<SurfacePoint> {
        match self {
            SliceFit::Smoothed { points, .. } | SliceFit::Fallback { points, .. } => points,
        }
    }

    pub fn year_fraction(&self) -> f64 {
        match self {
            SliceFit::Smoothed { year_fraction, .. } | SliceFit::Fallback { year_fraction, .. } => {
                *year_fraction
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SliceFit::Fallback { .. })
    }
}

/// Smooth one slice.
///
/// `smoothing_factor` sets the spline tightness and `smile_samples` the
/// number of output points.
pub fn smooth_slice(slice: &ExpirySlice, config: &SurfaceConfig) -> SliceFit {
    let t = slice.year_fraction;
    let (x, iv) = slice.smile();

    let fitted = SmoothingSpline::fit(&x, &iv, config.smoothing_factor).and_then(|spline| {
        let points: Vec<SurfacePoint> = spline
            .sample(config.smile_samples)
            .into_iter()
            .map(|(k, v)| SurfacePoint::new(k, t, v))
            .collect();
        if points.iter().any(|p| !p.z.is_finite()) {
            return Err(SurfaceError::NumericalError {
                message: "smoothed smile has non-finite values".into(),
            });
        }
        Ok(points)
    });

    match fitted {
        Ok(points) => SliceFit::Smoothed {
            year_fraction: t,
            points,
        },
        Err(e) => {
            #[cfg(feature = "logging")]
            tracing::warn!(
                expiration = %slice.expiration,
                n_quotes = slice.len(),
                error = %e,
                "smile fit failed, using raw points"
            );
            SliceFit::Fallback {
                year_fraction: t,
                points: x
                    .iter()
                    .zip(&iv)
                    .map(|(&k, &v)| SurfacePoint::new(k, t, v))
                    .collect(),
                reason: e.to_string(),
            }
        }
    }
}

/// Smooth every slice, in slice order. Empty slices are skipped.
///
/// Slices share nothing, so with the `parallel` feature they are fitted
/// on the rayon pool.
pub fn smooth_slices(slices: &[ExpirySlice], config: &SurfaceConfig) -> Vec<SliceFit> {
    #[cfg(feature = "parallel")]
    let fits: Vec<SliceFit> = slices
        .par_iter()
        .filter(|s| !s.is_empty())
        .map(|s| smooth_slice(s, config))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let fits: Vec<SliceFit> = slices
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| smooth_slice(s, config))
        .collect();

    #[cfg(feature = "logging")]
    tracing::debug!(
        n_slices = fits.len(),
        fallback = fits.iter().filter(|f| f.is_fallback()).count(),
        "smiles smoothed"
    );

    fits
}
