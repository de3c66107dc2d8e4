//! Error types for the ivsurf library.
//!
//! Only two conditions abort a pipeline run: a quote table that is missing
//! required columns, and too few surface points to fit. Everything else
//! (bad rows, illiquid quotes, failed smile fits, masked grid nodes) is
//! absorbed locally and shows up in the diagnostics instead.

use thiserror::Error;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// Errors that can occur while building or querying an implied-vol surface.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SurfaceError {
    /// The raw quote table lacks one or more required columns entirely.
    #[error("quote normalization failed: missing required columns {missing:?}")]
    MalformedInput {
        /// Every required column that was not found, in schema order.
        missing: Vec<String>,
    },

    /// Too few surface points survived filtering and smoothing to fit a surface.
    #[error(
        "surface interpolation failed: {available} points available, at least {required} required"
    )]
    InsufficientData {
        /// Minimum point count for a fit.
        required: usize,
        /// Points actually supplied.
        available: usize,
    },

    /// Input data or configuration is invalid (e.g., empty grid, negative threshold).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Numerical computation failed (e.g., singular RBF system, degenerate shape parameter).
    #[error("numerical error: {message}")]
    NumericalError { message: String },
}

impl SurfaceError {
    /// Name of the pipeline stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            SurfaceError::MalformedInput { .. } => "normalize",
            SurfaceError::InsufficientData { .. } => "interpolate",
            SurfaceError::InvalidInput { .. } => "input",
            SurfaceError::NumericalError { .. } => "numerics",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_input_lists_missing_columns() {
        let err = SurfaceError::MalformedInput {
            missing: vec!["strike".into(), "spot".into()],
        };
        match &err {
            SurfaceError::MalformedInput { missing } => {
                assert_eq!(missing, &["strike".to_string(), "spot".to_string()]);
            }
            _ => panic!("wrong variant"),
        }
        let display = format!("{err}");
        assert!(display.contains("strike"));
        assert!(display.contains("normalization"));
    }

    #[test]
    fn insufficient_data_fields_accessible() {
        let err = SurfaceError::InsufficientData {
            required: 3,
            available: 1,
        };
        match &err {
            SurfaceError::InsufficientData {
                required,
                available,
            } => {
                assert_eq!(*required, 3);
                assert_eq!(*available, 1);
            }
            _ => panic!("wrong variant"),
        }
        assert!(format!("{err}").contains("at least 3"));
    }

    #[test]
    fn stage_names_the_failing_component() {
        let malformed = SurfaceError::MalformedInput { missing: vec![] };
        let short = SurfaceError::InsufficientData {
            required: 3,
            available: 0,
        };
        assert_eq!(malformed.stage(), "normalize");
        assert_eq!(short.stage(), "interpolate");
    }

    #[test]
    fn error_display_includes_message() {
        let err = SurfaceError::InvalidInput {
            message: "bad input".into(),
        };
        assert!(format!("{err}").contains("bad input"));

        let err2 = SurfaceError::NumericalError {
            message: "singular matrix".into(),
        };
        assert!(format!("{err2}").contains("singular matrix"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SurfaceError>();
    }
}
