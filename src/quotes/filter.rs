//! Liquidity and sanity filtering.
//!
//! Each quote is checked against four rules, in order, and dropped on the
//! first one it fails:
//!
//! 1. **Out-of-the-money side**: calls need `K > F`, puts need `K < F`,
//!    with `F = S · exp((r − q) · T)`.
//! 2. **Liquidity**: `bid ≥ min_bid` and `open_interest ≥ min_open_interest`.
//! 3. **Validity**: implied vol finite with `0 < σ < max_implied_volatility`.
//! 4. **Expiry horizon**: `T ≥ min_year_fraction` and
//!    `0 ≤ days ≤ max_days_to_expiry`.
//!
//! An expiry left with no survivors is counted in the [`FilterReport`] and
//! otherwise ignored.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SurfaceConfig;
use crate::conventions::{days_to_expiry, forward_price, year_fraction};
use crate::types::{OptionType, RawQuote};

/// Which rule dropped a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    InTheMoney,
    Illiquid,
    InvalidVol,
    OutOfHorizon,
}

/// Drop counts for one filter pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    pub input: usize,
    pub kept: usize,
    pub in_the_money: usize,
    pub illiquid: usize,
    pub invalid_vol: usize,
    pub out_of_horizon: usize,
    /// Distinct expirations in the input.
    pub expiries_seen: usize,
    /// Expirations whose every quote was dropped.
    pub expiries_empty: usize,
}

impl FilterReport {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::InTheMoney => self.in_the_money += 1,
            Rejection::Illiquid => self.illiquid += 1,
            Rejection::InvalidVol => self.invalid_vol += 1,
            Rejection::OutOfHorizon => self.out_of_horizon += 1,
        }
    }
}

/// Survivors plus the report of what was dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    pub survivors: Vec<RawQuote>,
    pub report: FilterReport,
}

/// Forward price for a quote's expiry under the configured carry.
pub fn quote_forward(quote: &RawQuote, config: &SurfaceConfig) -> f64 {
    let t = year_fraction(days_to_expiry(quote.observed_on, quote.expiration));
    forward_price(quote.spot, config.risk_free_rate, config.dividend_yield, t)
}

/// Check one quote against the rules; `None` means it survives.
pub fn check_quote(quote: &RawQuote, config: &SurfaceConfig) -> Option<Rejection> {
    let days = days_to_expiry(quote.observed_on, quote.expiration);
    let t = year_fraction(days);
    let forward = forward_price(quote.spot, config.risk_free_rate, config.dividend_yield, t);

    let out_of_the_money = match quote.side {
        OptionType::Call => quote.strike > forward,
        OptionType::Put => quote.strike < forward,
    };
    if !out_of_the_money {
        return Some(Rejection::InTheMoney);
    }

    if quote.bid.is_nan()
        || quote.bid < config.min_bid
        || quote.open_interest < config.min_open_interest
    {
        return Some(Rejection::Illiquid);
    }

    let iv = quote.implied_vol;
    if !iv.is_finite() || iv <= 0.0 || iv >= config.max_implied_volatility {
        return Some(Rejection::InvalidVol);
    }

    if days < 0 || days > config.max_days_to_expiry || t < config.min_year_fraction {
        return Some(Rejection::OutOfHorizon);
    }

    None
}

/// Apply every rule to every quote, preserving input order.
pub fn filter_quotes(quotes: &[RawQuote], config: &SurfaceConfig) -> FilterOutcome {
    let mut report = FilterReport {
        input: quotes.len(),
        ..FilterReport::default()
    };
    let mut per_expiry: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut survivors = Vec::with_capacity(quotes.len());

    for quote in quotes {
        let kept = per_expiry.entry(quote.expiration).or_insert(0);
        match check_quote(quote, config) {
            Some(rejection) => report.record(rejection),
            None => {
                *kept += 1;
                survivors.push(quote.clone());
            }
        }
    }

    report.kept = survivors.len();
    report.expiries_seen = per_expiry.len();
    report.expiries_empty = per_expiry.values().filter(|&&n| n == 0).count();

    #[cfg(feature = "logging")]
    tracing::debug!(
        input = report.input,
        kept = report.kept,
        in_the_money = report.in_the_money,
        illiquid = report.illiquid,
        invalid_vol = report.invalid_vol,
        out_of_horizon = report.out_of_horizon,
        expiries_empty = report.expiries_empty,
        "quotes filtered"
    );

    FilterOutcome { survivors, report }
}
