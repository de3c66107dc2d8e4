//! Argument checks shared by the config, the spline and the surface fit.
//!
//! Every helper treats NaN and ±Inf as invalid and reports the offending
//! name and value in an [`SurfaceError::InvalidInput`].

use crate::error::{self, SurfaceError};

fn invalid(message: String) -> SurfaceError {
    SurfaceError::InvalidInput { message }
}

/// `value > 0` and finite.
pub(crate) fn validate_positive(value: f64, name: &str) -> error::Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(format!("{name} must be positive and finite, got {value}")))
    }
}

/// `value >= 0` and finite.
pub(crate) fn validate_non_negative(value: f64, name: &str) -> error::Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(format!("{name} must be non-negative and finite, got {value}")))
    }
}

pub(crate) fn validate_finite(value: f64, name: &str) -> error::Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(format!("{name} must be finite, got {value}")))
    }
}

/// `lo <= value <= hi`.
pub(crate) fn validate_in_range(value: f64, lo: f64, hi: f64, name: &str) -> error::Result<f64> {
    if value.is_finite() && (lo..=hi).contains(&value) {
        Ok(value)
    } else {
        Err(invalid(format!("{name} must be in [{lo}, {hi}], got {value}")))
    }
}

/// Sample counts, grid sizes and point minimums.
pub(crate) fn validate_count(value: usize, min: usize, name: &str) -> error::Result<usize> {
    if value >= min {
        Ok(value)
    } else {
        Err(invalid(format!("{name} must be at least {min}, got {value}")))
    }
}

/// A `(lo, hi)` pair of percentiles with `0 <= lo < hi <= 100`.
pub(crate) fn validate_percentiles(pair: (f64, f64), name: &str) -> error::Result<(f64, f64)> {
    let (lo, hi) = pair;
    validate_in_range(lo, 0.0, 100.0, name)?;
    validate_in_range(hi, 0.0, 100.0, name)?;
    if lo >= hi {
        return Err(invalid(format!("{name} must be increasing, got ({lo}, {hi})")));
    }
    Ok(pair)
}
