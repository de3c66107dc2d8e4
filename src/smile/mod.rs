//! Single-expiry smile smoothing.
//!
//! A smile is implied volatility as a function of log-moneyness at a fixed
//! expiry. Raw smiles are noisy; each one is replaced by a resampled
//! smoothing-spline curve before the global surface fit.
//!
//! - [`SmoothingSpline`] — cubic smoothing spline with a tightness knob
//! - [`smooth_slices`] — per-expiry smoothing with raw-point fallback

pub mod smoother;
pub mod spline;

pub use smoother::{SliceFit, smooth_slice, smooth_slices};
pub use spline::SmoothingSpline;
