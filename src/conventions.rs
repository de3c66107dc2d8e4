//! Market conventions for the surface coordinates.
//!
//! The stored x-coordinate is log-moneyness against **spot**; the forward is
//! only used to decide which side (call or put) is out of the money. Time is
//! an ACT/365 year fraction clamped to at least one day.

use chrono::NaiveDate;

/// Calendar days per year for year-fraction conversion.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Convert a strike to log-moneyness: k = ln(K / reference).
pub fn log_moneyness(strike: f64, reference: f64) -> f64 {
    (strike / reference).ln()
}

/// Compute forward price from spot: F = S · exp((r − q) · T).
pub fn forward_price(spot: f64, rate: f64, dividend_yield: f64, expiry: f64) -> f64 {
    spot * ((rate - dividend_yield) * expiry).exp()
}

/// Signed calendar days from `observed_on` to `expiration`.
pub fn days_to_expiry(observed_on: NaiveDate, expiration: NaiveDate) -> i64 {
    (expiration - observed_on).num_days()
}

/// Year fraction `max(days, 1) / 365`.
///
/// The one-day floor keeps later variance-to-vol inversion away from zero.
///
/// ```
/// use ivsurf::conventions::year_fraction;
/// assert_eq!(year_fraction(0), 1.0 / 365.0);
/// assert_eq!(year_fraction(-3), 1.0 / 365.0);
/// assert_eq!(year_fraction(365), 1.0);
/// ```
pub fn year_fraction(days: i64) -> f64 {
    days.max(1) as f64 / DAYS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn forward_grows_with_carry() {
        let f = forward_price(100.0, 0.05, 0.015, 1.0);
        assert_abs_diff_eq!(f, 100.0 * 0.035_f64.exp(), epsilon = 1e-12);
        assert_eq!(forward_price(95.0, 0.0, 0.0, 0.25), 95.0);
    }

    #[test]
    fn log_moneyness_sign_follows_strike() {
        assert!(log_moneyness(105.0, 100.0) > 0.0);
        assert!(log_moneyness(95.0, 100.0) < 0.0);
        assert_eq!(log_moneyness(100.0, 100.0), 0.0);
    }

    #[test]
    fn days_are_signed() {
        let obs = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let exp = NaiveDate::from_ymd_opt(2025, 3, 21).unwrap();
        assert_eq!(days_to_expiry(obs, exp), 70);
        assert_eq!(days_to_expiry(exp, obs), -70);
    }
}
