//! End-to-end surface construction from one snapshot of quotes.
//!
//! ```text
//! QuoteTable ─normalize─▶ RawQuote ─filter─▶ RawQuote ─transform─▶ CleanQuote
//!     ─group─▶ ExpirySlice ─smooth─▶ SurfacePoint ─fit─▶ RbfSurface
//! ```
//!
//! Only a table missing required columns or a point cloud too small to fit
//! aborts a run. Every other problem is absorbed by its stage and counted in
//! [`PipelineDiagnostics`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SurfaceConfig;
use crate::error;
use crate::quotes::{FilterReport, QuoteTable, filter_quotes, group_by_expiry, normalize_table, to_clean_quotes};
use crate::smile::{SliceFit, smooth_slices};
use crate::surface::{CoverageDiagnostics, Grid, RbfSurface, SurfaceBuilder, VolSurface};
use crate::types::{RawQuote, SurfacePoint};

/// What each stage absorbed on the way to the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Table rows dropped by the normalizer; zero when quotes came in typed.
    pub rows_dropped: usize,
    pub filter: FilterReport,
    /// Expiry slices whose smile spline fit succeeded.
    pub smoothed_slices: usize,
    /// Expiry slices that kept their raw points.
    pub fallback_slices: usize,
    pub coverage: CoverageDiagnostics,
    /// Variance-weighted mean absolute vol error on the fitted points;
    /// `None` if every point was masked.
    pub fit_error: Option<f64>,
}

/// A fitted surface plus everything needed to inspect or plot it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceFit {
    pub surface: RbfSurface,
    /// The point cloud the surface was fitted to.
    pub points: Vec<SurfacePoint>,
    /// Default display grid derived from `points`.
    pub grid: Grid,
    pub diagnostics: PipelineDiagnostics,
}

/// Build a surface from typed quotes.
///
/// # Errors
/// - [`SurfaceError::InvalidInput`](crate::SurfaceError::InvalidInput) if
///   `config` fails validation.
/// - [`SurfaceError::InsufficientData`](crate::SurfaceError::InsufficientData)
///   if fewer than `min_surface_points` points reach the interpolator.
/// - [`SurfaceError::NumericalError`](crate::SurfaceError::NumericalError)
///   if the interpolation system cannot be solved.
pub fn build_surface(quotes: &[RawQuote], config: &SurfaceConfig) -> error::Result<SurfaceFit> {
    config.validate()?;

    #[cfg(feature = "logging")]
    tracing::debug!(n_quotes = quotes.len(), "surface pipeline started");

    let outcome = filter_quotes(quotes, config);
    let clean = to_clean_quotes(&outcome.survivors, config);
    let slices = group_by_expiry(clean);
    let fits = smooth_slices(&slices, config);

    let fallback_slices = fits.iter().filter(|f| f.is_fallback()).count();
    let smoothed_slices = fits.len() - fallback_slices;
    let points: Vec<SurfacePoint> = fits.into_iter().flat_map(SliceFit::into_points).collect();

    #[cfg(feature = "logging")]
    tracing::debug!(
        n_slices = slices.len(),
        smoothed_slices,
        fallback_slices,
        n_points = points.len(),
        "surface points assembled"
    );

    let surface = SurfaceBuilder::from_config(config)
        .add_points(&points)
        .build()?;

    let grid = Grid::from_points(
        &points,
        config.grid_percentiles,
        config.grid_resolution_x,
        config.grid_resolution_y,
    )?;
    let coverage = CoverageDiagnostics::from_points(&points, config.atm_band);
    let fit_error = surface.fit_error(&points).ok();

    #[cfg(feature = "logging")]
    tracing::debug!(
        n_points = points.len(),
        fit_error = ?fit_error,
        two_sided = coverage.is_two_sided(),
        "surface pipeline complete"
    );

    Ok(SurfaceFit {
        surface,
        points,
        grid,
        diagnostics: PipelineDiagnostics {
            rows_dropped: 0,
            filter: outcome.report,
            smoothed_slices,
            fallback_slices,
            coverage,
            fit_error,
        },
    })
}

/// Normalize a raw quote table observed on `as_of`, then [`build_surface`].
///
/// # Errors
/// [`SurfaceError::MalformedInput`](crate::SurfaceError::MalformedInput) if
/// the table lacks required columns, otherwise as for [`build_surface`].
pub fn build_surface_from_table(
    table: &QuoteTable,
    as_of: NaiveDate,
    config: &SurfaceConfig,
) -> error::Result<SurfaceFit> {
    let normalized = normalize_table(table, as_of)?;
    let mut fit = build_surface(&normalized.quotes, config)?;
    fit.diagnostics.rows_dropped = normalized.rows_dropped;
    Ok(fit)
}
