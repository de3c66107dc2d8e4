//! Pipeline configuration.
//!
//! [`SurfaceConfig`] is the single explicit input (besides the quotes) of a
//! pipeline run. Defaults reproduce the reference settings used for liquid
//! US equity and ETF chains.
//!
//! ```
//! use ivsurf::config::SurfaceConfig;
//!
//! let config = SurfaceConfig::default()
//!     .rates(0.045, 0.013)
//!     .min_open_interest(10)
//!     .smoothing_factor(0.999);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{self, SurfaceError};
use crate::surface::rbf::RbfKernel;
use crate::validate::{
    validate_count, validate_finite, validate_in_range, validate_non_negative, validate_percentiles,
    validate_positive,
};

/// Tunables for every pipeline stage.
///
/// Deserialization fills missing fields from [`Default`] and rejects
/// out-of-range values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SurfaceConfigRaw", into = "SurfaceConfigRaw")]
pub struct SurfaceConfig {
    /// Continuously compounded risk-free rate r.
    pub risk_free_rate: f64,
    /// Continuous dividend yield q.
    pub dividend_yield: f64,
    /// Expiries further out than this many calendar days are dropped.
    pub max_days_to_expiry: i64,
    /// Expiries with a year fraction below this floor are dropped.
    pub min_year_fraction: f64,
    /// Implied vols at or above this are treated as garbage.
    pub max_implied_volatility: f64,
    pub min_bid: f64,
    pub min_open_interest: u64,
    /// Smile spline tightness in (0, 1]: 1 interpolates, lower is smoother.
    pub smoothing_factor: f64,
    /// Samples emitted per successfully smoothed expiry.
    pub smile_samples: usize,
    pub rbf_kernel: RbfKernel,
    /// ε = scale · sqrt(var(x) + var(y)).
    pub rbf_epsilon_scale: f64,
    /// Diagonal smoothing term of the RBF system.
    pub rbf_smoothing: f64,
    /// Fewer surface points than this is a fatal [`SurfaceError::InsufficientData`].
    pub min_surface_points: usize,
    pub grid_resolution_x: usize,
    pub grid_resolution_y: usize,
    /// Lower and upper percentiles of log-moneyness spanned by the default grid.
    pub grid_percentiles: (f64, f64),
    /// Half-width of the at-the-money band used by the coverage diagnostics.
    pub atm_band: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct SurfaceConfigRaw {
    risk_free_rate: f64,
    dividend_yield: f64,
    max_days_to_expiry: i64,
    min_year_fraction: f64,
    max_implied_volatility: f64,
    min_bid: f64,
    min_open_interest: u64,
    smoothing_factor: f64,
    smile_samples: usize,
    rbf_kernel: RbfKernel,
    rbf_epsilon_scale: f64,
    rbf_smoothing: f64,
    min_surface_points: usize,
    grid_resolution_x: usize,
    grid_resolution_y: usize,
    grid_percentiles: (f64, f64),
    atm_band: f64,
}

impl Default for SurfaceConfigRaw {
    fn default() -> Self {
        SurfaceConfig::default().into()
    }
}

impl TryFrom<SurfaceConfigRaw> for SurfaceConfig {
    type Error = SurfaceError;
    fn try_from(raw: SurfaceConfigRaw) -> Result<Self, Self::Error> {
        let config = Self {
            risk_free_rate: raw.risk_free_rate,
            dividend_yield: raw.dividend_yield,
            max_days_to_expiry: raw.max_days_to_expiry,
            min_year_fraction: raw.min_year_fraction,
            max_implied_volatility: raw.max_implied_volatility,
            min_bid: raw.min_bid,
            min_open_interest: raw.min_open_interest,
            smoothing_factor: raw.smoothing_factor,
            smile_samples: raw.smile_samples,
            rbf_kernel: raw.rbf_kernel,
            rbf_epsilon_scale: raw.rbf_epsilon_scale,
            rbf_smoothing: raw.rbf_smoothing,
            min_surface_points: raw.min_surface_points,
            grid_resolution_x: raw.grid_resolution_x,
            grid_resolution_y: raw.grid_resolution_y,
            grid_percentiles: raw.grid_percentiles,
            atm_band: raw.atm_band,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<SurfaceConfig> for SurfaceConfigRaw {
    fn from(c: SurfaceConfig) -> Self {
        Self {
            risk_free_rate: c.risk_free_rate,
            dividend_yield: c.dividend_yield,
            max_days_to_expiry: c.max_days_to_expiry,
            min_year_fraction: c.min_year_fraction,
            max_implied_volatility: c.max_implied_volatility,
            min_bid: c.min_bid,
            min_open_interest: c.min_open_interest,
            smoothing_factor: c.smoothing_factor,
            smile_samples: c.smile_samples,
            rbf_kernel: c.rbf_kernel,
            rbf_epsilon_scale: c.rbf_epsilon_scale,
            rbf_smoothing: c.rbf_smoothing,
            min_surface_points: c.min_surface_points,
            grid_resolution_x: c.grid_resolution_x,
            grid_resolution_y: c.grid_resolution_y,
            grid_percentiles: c.grid_percentiles,
            atm_band: c.atm_band,
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            dividend_yield: 0.015,
            max_days_to_expiry: 365,
            min_year_fraction: 0.03,
            max_implied_volatility: 3.0,
            min_bid: 0.01,
            min_open_interest: 5,
            smoothing_factor: 0.9999,
            smile_samples: 50,
            rbf_kernel: RbfKernel::Multiquadric,
            rbf_epsilon_scale: 0.5,
            rbf_smoothing: 0.0006,
            min_surface_points: 3,
            grid_resolution_x: 80,
            grid_resolution_y: 40,
            grid_percentiles: (5.0, 95.0),
            atm_band: 0.02,
        }
    }
}

impl SurfaceConfig {
    /// Set the risk-free rate and dividend yield used for the forward.
    pub fn rates(mut self, risk_free_rate: f64, dividend_yield: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self.dividend_yield = dividend_yield;
        self
    }

    /// Set the expiry horizon: drop expiries below `min_year_fraction`
    /// or beyond `max_days` calendar days.
    pub fn horizon(mut self, min_year_fraction: f64, max_days: i64) -> Self {
        self.min_year_fraction = min_year_fraction;
        self.max_days_to_expiry = max_days;
        self
    }

    pub fn max_implied_volatility(mut self, max_iv: f64) -> Self {
        self.max_implied_volatility = max_iv;
        self
    }

    pub fn min_bid(mut self, min_bid: f64) -> Self {
        self.min_bid = min_bid;
        self
    }

    pub fn min_open_interest(mut self, min_oi: u64) -> Self {
        self.min_open_interest = min_oi;
        self
    }

    /// Set the smile spline tightness. 1.0 interpolates the raw quotes.
    pub fn smoothing_factor(mut self, p: f64) -> Self {
        self.smoothing_factor = p;
        self
    }

    pub fn smile_samples(mut self, n: usize) -> Self {
        self.smile_samples = n;
        self
    }

    /// Set the RBF kernel, shape-parameter scale and diagonal smoothing.
    pub fn rbf(mut self, kernel: RbfKernel, epsilon_scale: f64, smoothing: f64) -> Self {
        self.rbf_kernel = kernel;
        self.rbf_epsilon_scale = epsilon_scale;
        self.rbf_smoothing = smoothing;
        self
    }

    pub fn min_surface_points(mut self, n: usize) -> Self {
        self.min_surface_points = n;
        self
    }

    pub fn grid_resolution(mut self, nx: usize, ny: usize) -> Self {
        self.grid_resolution_x = nx;
        self.grid_resolution_y = ny;
        self
    }

    pub fn grid_percentiles(mut self, lower: f64, upper: f64) -> Self {
        self.grid_percentiles = (lower, upper);
        self
    }

    pub fn atm_band(mut self, band: f64) -> Self {
        self.atm_band = band;
        self
    }

    /// Check every field for range and finiteness.
    ///
    /// # Errors
    /// Returns [`SurfaceError::InvalidInput`] naming the first bad field.
    pub fn validate(&self) -> error::Result<()> {
        validate_finite(self.risk_free_rate, "risk_free_rate")?;
        validate_finite(self.dividend_yield, "dividend_yield")?;
        if self.max_days_to_expiry < 1 {
            return Err(SurfaceError::InvalidInput {
                message: format!(
                    "max_days_to_expiry must be at least 1, got {}",
                    self.max_days_to_expiry
                ),
            });
        }
        validate_non_negative(self.min_year_fraction, "min_year_fraction")?;
        validate_positive(self.max_implied_volatility, "max_implied_volatility")?;
        validate_non_negative(self.min_bid, "min_bid")?;
        validate_positive(self.smoothing_factor, "smoothing_factor")?;
        validate_in_range(self.smoothing_factor, 0.0, 1.0, "smoothing_factor")?;
        validate_count(self.smile_samples, 2, "smile_samples")?;
        validate_positive(self.rbf_epsilon_scale, "rbf_epsilon_scale")?;
        validate_non_negative(self.rbf_smoothing, "rbf_smoothing")?;
        validate_count(self.min_surface_points, 1, "min_surface_points")?;
        validate_count(self.grid_resolution_x, 2, "grid_resolution_x")?;
        validate_count(self.grid_resolution_y, 2, "grid_resolution_y")?;
        validate_percentiles(self.grid_percentiles, "grid_percentiles")?;
        validate_non_negative(self.atm_band, "atm_band")?;
        Ok(())
    }
}
