//! Quote ingestion: normalization, liquidity/sanity filtering and the
//! coordinate transform into (log-moneyness, year fraction).

pub mod filter;
pub mod normalize;
pub mod transform;

pub use filter::{FilterOutcome, FilterReport, Rejection, filter_quotes};
pub use normalize::{NormalizedQuotes, QuoteTable, normalize_table};
pub use transform::{ExpirySlice, group_by_expiry, to_clean_quotes};
