//! Core domain types for surface construction.
//!
//! # Newtype Strategy
//!
//! **Outputs use newtypes**: [`Vol`] and [`Variance`] wrap values
//! the library hands back so a volatility cannot silently be used as a
//! total variance.
//!
//! **Records use bare `f64` fields**: [`RawQuote`], [`CleanQuote`] and
//! [`SurfacePoint`] are plain value records flowing between pipeline stages.
//!
//! # Why no `Eq` or `Ord`?
//! These types wrap `f64`, which does not implement `Eq` or `Ord` because `NaN`
//! breaks total ordering. We derive `PartialEq` and `PartialOrd` only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Implied volatility `σ`, measured as annualized standard deviation.
///
/// # Examples
/// ```
/// use ivsurf::types::Vol;
/// let vol = Vol(0.20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

/// Total Black variance `σ²T`.
///
/// The global interpolator fits total variance rather than volatility
/// because it varies smoothly across maturities.
///
/// # Examples
/// ```
/// use ivsurf::types::Variance;
/// let var = Variance(0.01); // 20% vol over a quarter
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Variance(pub f64);

/// Option type: call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Right to buy at strike price.
    Call,
    /// Right to sell at strike price.
    Put,
}

impl OptionType {
    /// Parse the side labels used by option-chain snapshots
    /// (`C`, `P`, `call`, `put`; case-insensitive).
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "c" | "call" | "calls" => Some(OptionType::Call),
            "p" | "put" | "puts" => Some(OptionType::Put),
            _ => None,
        }
    }
}

/// One observed option contract state, as supplied by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    pub side: OptionType,
    pub strike: f64,
    pub bid: f64,
    pub open_interest: u64,
    /// Vendor implied vol. May be NaN or infinite; the filter rejects those.
    pub implied_vol: f64,
    pub expiration: NaiveDate,
    pub spot: f64,
    /// Date the quote was observed; days to expiry are counted from here.
    pub observed_on: NaiveDate,
}

/// A quote that passed the liquidity and sanity filter, with its surface
/// coordinates attached.
///
/// Invariant: `year_fraction > 0` and `0 < implied_vol < max_implied_volatility`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanQuote {
    pub side: OptionType,
    pub strike: f64,
    pub implied_vol: f64,
    pub expiration: NaiveDate,
    /// Calendar days from observation to expiry (before clamping).
    pub days_to_expiry: i64,
    /// `ln(strike / spot)`.
    pub log_moneyness: f64,
    /// `max(days, 1) / 365`.
    pub year_fraction: f64,
    /// Forward used for the out-of-the-money side test.
    pub forward: f64,
}

/// A point of the scattered implied-vol cloud fed to the global interpolator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    /// Log-moneyness.
    pub x: f64,
    /// Year fraction.
    pub y: f64,
    /// Implied volatility.
    pub z: f64,
}

impl SurfacePoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Black total variance `z² · y`, the interpolation target.
    ///
    /// ```
    /// use ivsurf::types::SurfacePoint;
    /// let p = SurfacePoint::new(0.0, 0.25, 0.20);
    /// assert!((p.total_variance().0 - 0.01).abs() < 1e-15);
    /// ```
    pub fn total_variance(&self) -> Variance {
        Variance(self.z * self.z * self.y)
    }
}
