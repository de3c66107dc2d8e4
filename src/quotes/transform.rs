//! Coordinate transform: filtered [`RawQuote`] → [`CleanQuote`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SurfaceConfig;
use crate::conventions::{days_to_expiry, forward_price, log_moneyness, year_fraction};
use crate::types::{CleanQuote, RawQuote};

/// Attach surface coordinates to a quote that passed the filter.
///
/// Log-moneyness is taken against spot; the forward is carried along for
/// reference only.
pub fn to_clean_quote(quote: &RawQuote, config: &SurfaceConfig) -> CleanQuote {
    let days = days_to_expiry(quote.observed_on, quote.expiration);
    let t = year_fraction(days);
    CleanQuote {
        side: quote.side,
        strike: quote.strike,
        implied_vol: quote.implied_vol,
        expiration: quote.expiration,
        days_to_expiry: days,
        log_moneyness: log_moneyness(quote.strike, quote.spot),
        year_fraction: t,
        forward: forward_price(quote.spot, config.risk_free_rate, config.dividend_yield, t),
    }
}

pub fn to_clean_quotes(quotes: &[RawQuote], config: &SurfaceConfig) -> Vec<CleanQuote> {
    quotes.iter().map(|q| to_clean_quote(q, config)).collect()
}

/// All clean quotes sharing one expiration and one year fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirySlice {
    pub expiration: NaiveDate,
    pub year_fraction: f64,
    /// Sorted by ascending log-moneyness.
    pub quotes: Vec<CleanQuote>,
}

impl ExpirySlice {
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// `(log-moneyness, implied vol)` pairs in slice order.
    pub fn smile(&self) -> (Vec<f64>, Vec<f64>) {
        self.quotes
            .iter()
            .map(|q| (q.log_moneyness, q.implied_vol))
            .unzip()
    }
}

/// Group clean quotes into slices of one maturity, earliest expiration first.
///
/// A slice holds quotes sharing both the expiration and the days to expiry,
/// so quotes observed on different dates never share a year fraction.
/// Slices with the same expiration are ordered by ascending days.
pub fn group_by_expiry(quotes: Vec<CleanQuote>) -> Vec<ExpirySlice> {
    let mut by_maturity: BTreeMap<(NaiveDate, i64), Vec<CleanQuote>> = BTreeMap::new();
    for q in quotes {
        by_maturity
            .entry((q.expiration, q.days_to_expiry))
            .or_default()
            .push(q);
    }
    by_maturity
        .into_iter()
        .map(|((expiration, days), mut quotes)| {
            quotes.sort_by(|a, b| a.log_moneyness.total_cmp(&b.log_moneyness));
            ExpirySlice {
                expiration,
                year_fraction: year_fraction(days),
                quotes,
            }
        })
        .collect()
}
