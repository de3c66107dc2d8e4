//! Builder API for the global surface fit.
//!
//! ```
//! use ivsurf::surface::{SurfaceBuilder, RbfKernel, VolSurface};
//! use ivsurf::types::SurfacePoint;
//!
//! let points: Vec<SurfacePoint> = [0.25, 0.5, 1.0]
//!     .iter()
//!     .flat_map(|&t| {
//!         [-0.2, -0.1, 0.0, 0.1, 0.2]
//!             .iter()
//!             .map(move |&k| SurfacePoint::new(k, t, 0.2 + 0.2 * k * k))
//!     })
//!     .collect();
//!
//! let surface = SurfaceBuilder::new()
//!     .kernel(RbfKernel::Multiquadric)
//!     .add_points(&points)
//!     .build()
//!     .unwrap();
//!
//! let vol = surface.black_vol(0.05, 0.75).unwrap();
//! assert!((vol.0 - 0.2005).abs() < 5e-3);
//! ```

use crate::config::SurfaceConfig;
use crate::error::SurfaceError;
use crate::surface::RbfSurface;
use crate::surface::rbf::{RbfInterpolant, RbfKernel, shape_parameter};
use crate::types::SurfacePoint;
use crate::validate::{validate_non_negative, validate_positive};

/// Builder for fitting an [`RbfSurface`] to a scattered implied-vol cloud.
///
/// Each point's vol is converted to total variance `z² · y` before the fit,
/// so the surface interpolates in the space where maturities blend
/// smoothly.
///
/// # Examples
///
/// ```
/// use ivsurf::config::SurfaceConfig;
/// use ivsurf::surface::SurfaceBuilder;
/// use ivsurf::types::SurfacePoint;
///
/// let points = [
///     SurfacePoint::new(-0.05, 0.25, 0.25),
///     SurfacePoint::new(0.05, 0.25, 0.20),
/// ];
/// let result = SurfaceBuilder::from_config(&SurfaceConfig::default())
///     .add_points(&points)
///     .build();
/// assert!(matches!(result, Err(ivsurf::SurfaceError::InsufficientData { .. })));
/// ```
#[derive(Debug, Clone)]
pub struct SurfaceBuilder {
    kernel: RbfKernel,
    epsilon_scale: f64,
    smoothing: f64,
    min_points: usize,
    points: Vec<SurfacePoint>,
}

impl SurfaceBuilder {
    /// Builder with the default kernel settings: multiquadric, ε scale 0.5,
    /// smoothing 0.0006, at least 3 points.
    pub fn new() -> Self {
        Self::from_config(&SurfaceConfig::default())
    }

    /// Builder taking its kernel settings from `config`.
    pub fn from_config(config: &SurfaceConfig) -> Self {
        Self {
            kernel: config.rbf_kernel,
            epsilon_scale: config.rbf_epsilon_scale,
            smoothing: config.rbf_smoothing,
            min_points: config.min_surface_points,
            points: Vec::new(),
        }
    }

    pub fn kernel(mut self, kernel: RbfKernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Multiplier on the cloud spread `sqrt(var(x) + var(y))` giving ε.
    pub fn epsilon_scale(mut self, scale: f64) -> Self {
        self.epsilon_scale = scale;
        self
    }

    /// Diagonal smoothing term; 0 interpolates exactly.
    pub fn smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Minimum number of points accepted by [`build`](Self::build).
    pub fn min_points(mut self, n: usize) -> Self {
        self.min_points = n;
        self
    }

    pub fn add_point(mut self, point: SurfacePoint) -> Self {
        self.points.push(point);
        self
    }

    pub fn add_points(mut self, points: &[SurfacePoint]) -> Self {
        self.points.extend_from_slice(points);
        self
    }

    /// Fit the surface.
    ///
    /// # Errors
    /// - [`SurfaceError::InsufficientData`] if fewer than `min_points`
    ///   points were added.
    /// - [`SurfaceError::InvalidInput`] for a non-finite point, a
    ///   non-positive year fraction or bad kernel settings.
    /// - [`SurfaceError::NumericalError`] if ε degenerates (all points
    ///   coincide) or the interpolation system is singular.
    pub fn build(self) -> crate::error::Result<RbfSurface> {
        #[cfg(feature = "logging")]
        tracing::debug!(
            n_points = self.points.len(),
            kernel = ?self.kernel,
            "surface fit started"
        );

        let required = self.min_points.max(1);
        if self.points.len() < required {
            return Err(SurfaceError::InsufficientData {
                required,
                available: self.points.len(),
            });
        }

        validate_positive(self.epsilon_scale, "rbf epsilon scale")?;
        validate_non_negative(self.smoothing, "rbf smoothing")?;
        if let Some(bad) = self
            .points
            .iter()
            .find(|p| !p.x.is_finite() || !p.z.is_finite() || !p.y.is_finite() || p.y <= 0.0)
        {
            return Err(SurfaceError::InvalidInput {
                message: format!(
                    "surface points need finite coordinates and positive year fraction, got {bad:?}"
                ),
            });
        }

        let centers: Vec<(f64, f64)> = self.points.iter().map(|p| (p.x, p.y)).collect();
        let variances: Vec<f64> = self.points.iter().map(|p| p.total_variance().0).collect();

        let epsilon = shape_parameter(&centers, self.epsilon_scale);
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(SurfaceError::NumericalError {
                message: format!(
                    "rbf shape parameter must be positive and finite, got {epsilon} (points coincide?)"
                ),
            });
        }

        let interpolant =
            RbfInterpolant::fit(&centers, &variances, self.kernel, epsilon, self.smoothing)?;

        #[cfg(feature = "logging")]
        tracing::debug!(n_points = interpolant.len(), epsilon, "surface fit complete");

        Ok(RbfSurface::new(interpolant))
    }
}

impl Default for SurfaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
