//! Quote normalization: untyped table rows → [`RawQuote`].
//!
//! The data source hands over a table with named columns and string cells
//! (a CSV snapshot, a vendor API response flattened to rows). Structural
//! problems, meaning a required column that is absent from the table
//! altogether, are fatal. Per-row problems only drop the row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{self, SurfaceError};
use crate::types::{OptionType, RawQuote};

/// Columns every quote table must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "side",
    "strike",
    "bid",
    "openInterest",
    "impliedVolatility",
    "expiration",
    "spot",
];

/// Optional observation timestamp column (`YYYY-MM-DD...`).
pub const TIMESTAMP_COLUMN: &str = "timestamp";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A raw option-chain table: named columns and rows of optional text cells.
///
/// Empty strings are treated as missing cells.
///
/// ```
/// use ivsurf::quotes::QuoteTable;
///
/// let mut table = QuoteTable::new(["side", "strike", "impliedVolatility"]);
/// table.push_row(["C", "105", "0.22"]);
/// table.push_row(["P", "", "0.25"]);
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.cell(1, "strike"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl QuoteTable {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row of cells in column order. Short rows are padded with
    /// missing cells; extra cells are ignored.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut row: Vec<Option<String>> = cells
            .into_iter()
            .take(self.columns.len())
            .map(|c| {
                let c = c.as_ref().trim();
                (!c.is_empty()).then(|| c.to_string())
            })
            .collect();
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell text at `(row, column)`, `None` when missing.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let j = self.column_index(column)?;
        self.rows.get(row)?.get(j)?.as_deref()
    }
}

/// Output of [`normalize_table`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedQuotes {
    pub quotes: Vec<RawQuote>,
    pub rows_read: usize,
    /// Rows dropped for missing or unusable market data.
    pub rows_dropped: usize,
}

struct Columns {
    side: usize,
    strike: usize,
    bid: usize,
    open_interest: usize,
    implied_vol: usize,
    expiration: usize,
    spot: usize,
    timestamp: Option<usize>,
}

impl Columns {
    fn resolve(table: &QuoteTable) -> error::Result<Self> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| table.column_index(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SurfaceError::MalformedInput { missing });
        }
        let idx = |name: &str| table.column_index(name).unwrap_or_default();
        Ok(Self {
            side: idx("side"),
            strike: idx("strike"),
            bid: idx("bid"),
            open_interest: idx("openInterest"),
            implied_vol: idx("impliedVolatility"),
            expiration: idx("expiration"),
            spot: idx("spot"),
            timestamp: table.column_index(TIMESTAMP_COLUMN),
        })
    }
}

/// Type every row of `table` into a [`RawQuote`].
///
/// `as_of` is the observation date for rows without a parseable `timestamp`.
///
/// Rows are dropped (and counted) when strike or implied vol is missing or
/// unparseable, the strike is not positive, the side is unknown, the
/// expiration is not a `YYYY-MM-DD` date, or the spot is unusable. Missing
/// bid and open interest default to zero. Textual `nan`/`inf` implied vols
/// are kept as non-finite values for the filter to reject.
///
/// # Errors
/// Returns [`SurfaceError::MalformedInput`] if any of [`REQUIRED_COLUMNS`]
/// is absent from the table.
pub fn normalize_table(table: &QuoteTable, as_of: NaiveDate) -> error::Result<NormalizedQuotes> {
    let cols = Columns::resolve(table)?;

    let quotes: Vec<RawQuote> = table
        .rows
        .iter()
        .filter_map(|row| normalize_row(row, &cols, as_of))
        .collect();
    let rows_dropped = table.len() - quotes.len();

    #[cfg(feature = "logging")]
    tracing::debug!(
        rows = table.len(),
        kept = quotes.len(),
        dropped = rows_dropped,
        "quote table normalized"
    );

    Ok(NormalizedQuotes {
        quotes,
        rows_read: table.len(),
        rows_dropped,
    })
}

fn normalize_row(row: &[Option<String>], cols: &Columns, as_of: NaiveDate) -> Option<RawQuote> {
    let text = |j: usize| row.get(j).and_then(|c| c.as_deref());

    let strike = parse_f64(text(cols.strike)?)?;
    if !strike.is_finite() || strike <= 0.0 {
        return None;
    }
    let implied_vol = parse_f64(text(cols.implied_vol)?)?;
    let side = OptionType::parse(text(cols.side)?)?;
    let expiration = parse_date(text(cols.expiration)?)?;
    let spot = parse_f64(text(cols.spot)?)?;
    if !spot.is_finite() || spot <= 0.0 {
        return None;
    }

    let bid = match text(cols.bid) {
        Some(s) => parse_f64(s).filter(|b| b.is_finite())?.max(0.0),
        None => 0.0,
    };
    let open_interest = match text(cols.open_interest) {
        Some(s) => parse_count(s)?,
        None => 0,
    };
    let observed_on = cols
        .timestamp
        .and_then(text)
        .and_then(parse_date)
        .unwrap_or(as_of);

    Some(RawQuote {
        side,
        strike,
        bid,
        open_interest,
        implied_vol,
        expiration,
        spot,
        observed_on,
    })
}

fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// Open interest is an integer but snapshots often store it as `12.0`.
fn parse_count(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    let v = s.parse::<f64>().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(v.max(0.0).floor() as u64)
}

/// Parse the leading `YYYY-MM-DD` of a date or timestamp string.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}
