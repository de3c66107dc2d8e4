//! # ivsurf
//!
//! Implied-volatility surface construction from one snapshot of listed
//! option quotes.
//!
//! Provides the full pipeline: raw quote table → normalized quotes →
//! liquidity and sanity filter → (log-moneyness, year fraction) coordinates →
//! per-expiry smile smoothing → global radial-basis fit in total variance →
//! gridded implied vols with diagnostics.
//!
//! ## Architecture
//!
//! - **`quotes`** — Normalization, filtering and coordinate transform
//! - **`smile`** — Per-expiry smoothing spline with raw-point fallback
//! - **`surface`** — Global RBF fit, grid evaluation and diagnostics
//! - **`pipeline`** — One-call orchestration of every stage
//!
//! ## Design
//!
//! - **Newtypes for outputs, bare `f64` for records.** [`Vol`] and
//!   [`Variance`] wrap surface answers to prevent accidental mixing.
//! - **No panics.** Every fallible operation returns [`Result`]. Library code
//!   never calls `unwrap()` or `expect()`.
//! - **Two fatal errors.** Only a table missing required columns or a
//!   point cloud too small to fit aborts a run; everything else degrades
//!   locally and is counted in the pipeline diagnostics.
//! - **Immutable, thread-safe surfaces.** [`VolSurface`] requires
//!   `Send + Sync`; a fitted surface can be shared via `Arc` across threads.
//! - **Serializable.** Value types, reports and [`SurfaceConfig`] implement
//!   Serde `Serialize` / `Deserialize`, with validation on deserialization
//!   for the config.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use ivsurf::{build_surface_from_table, QuoteTable, SurfaceConfig, VolSurface};
//!
//! let mut table = QuoteTable::new([
//!     "side", "strike", "bid", "openInterest", "impliedVolatility", "expiration", "spot",
//! ]);
//! for (side, strike, iv) in [("put", "90", "0.25"), ("call", "100", "0.20"), ("call", "105", "0.22")] {
//!     table.push_row([side, strike, "1.5", "120", iv, "2025-04-02", "95"]);
//! }
//!
//! let as_of = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
//! let fit = build_surface_from_table(&table, as_of, &SurfaceConfig::default().rates(0.0, 0.0))?;
//! assert_eq!(fit.points.len(), 3);
//! let vols = fit.surface.evaluate_grid(&fit.grid);
//! assert_eq!(vols.values.len(), 80 * 40);
//! # Ok::<(), ivsurf::SurfaceError>(())
//! ```

pub mod config;
pub mod conventions;
pub mod error;
pub mod pipeline;
pub mod quotes;
pub mod smile;
pub mod surface;
pub mod types;
mod validate;

#[doc(inline)]
pub use config::SurfaceConfig;
#[doc(inline)]
pub use error::{Result, SurfaceError};
#[doc(inline)]
pub use pipeline::{PipelineDiagnostics, SurfaceFit, build_surface, build_surface_from_table};
#[doc(inline)]
pub use quotes::QuoteTable;
#[doc(inline)]
pub use surface::{RbfSurface, VolSurface};
#[doc(inline)]
pub use types::{CleanQuote, OptionType, RawQuote, SurfacePoint, Variance, Vol};
