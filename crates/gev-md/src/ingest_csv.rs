//! CSV ingestion for the two source tables.
//!
//! ## Gas price table
//!
//! One of these header pairs (case-insensitive, whitespace-collapsed):
//!
//! | date column | price column                                                                        |
//! |-------------|-------------------------------------------------------------------------------------|
//! | `Date`      | `Weekly U.S. All Grades All Formulations Retail Gasoline Prices (Dollars per Gallon)` |
//! | `timestamp` | `price`                                                                             |
//!
//! Rows with an unparsable date are rejected. An empty or non-numeric price
//! is kept as an absent value so cadence validation still sees the week.
//!
//! ## EV registration table
//!
//! | date column               | name column    |
//! |---------------------------|----------------|
//! | `Registration Valid Date` | `Vehicle Name` |
//! | `registration_date`       | `vehicle_name` |
//!
//! Each accepted row is one occurrence. Rows with an unparsable date or an
//! empty vehicle name are rejected.
//!
//! Only header problems and unreadable files are errors; row-level problems
//! are counted in [`IngestStats`] and skipped.

use std::fmt;
use std::io::Read;
use std::path::Path;

use gev_reconcile::{EventSeries, RawSeries, TimePoint};

use crate::dates::{parse_date, parse_price};

const GAS_HEADERS: &[(&str, &str)] = &[
    (
        "Date",
        "Weekly U.S. All Grades All Formulations Retail Gasoline Prices  (Dollars per Gallon)",
    ),
    ("timestamp", "price"),
];

const EV_HEADERS: &[(&str, &str)] = &[
    ("Registration Valid Date", "Vehicle Name"),
    ("registration_date", "vehicle_name"),
];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced by CSV parsing in this module.
#[derive(Debug)]
pub enum CsvIngestError {
    /// The file could not be opened or read.
    Io(String),
    /// None of the accepted header pairs is present.
    MissingHeader(String),
}

impl fmt::Display for CsvIngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvIngestError::Io(msg) => write!(f, "csv io error: {msg}"),
            CsvIngestError::MissingHeader(cols) => {
                write!(f, "csv missing required header columns: {cols}")
            }
        }
    }
}

impl std::error::Error for CsvIngestError {}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Row accounting for one parsed table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub rows_read: u64,
    pub rows_accepted: u64,
    pub rows_rejected: u64,
    /// Accepted rows whose value cell was empty or non-numeric.
    pub values_absent: u64,
}

/// Parsed data plus its row accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested<T> {
    pub data: T,
    pub stats: IngestStats,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn parse_gas_csv_file(path: &Path) -> Result<Ingested<RawSeries>, CsvIngestError> {
    let src = read_file(path)?;
    parse_gas_csv_str(&src)
}

/// Parse a gas price table from memory. Empty input yields an empty series.
pub fn parse_gas_csv_str(src: &str) -> Result<Ingested<RawSeries>, CsvIngestError> {
    let mut rdr = reader(src.as_bytes());
    let Some((date_i, price_i)) = resolve_columns(&mut rdr, GAS_HEADERS)? else {
        return Ok(Ingested {
            data: RawSeries::default(),
            stats: IngestStats::default(),
        });
    };

    let mut stats = IngestStats::default();
    let mut points = Vec::new();
    for rec in rdr.records() {
        stats.rows_read += 1;
        let Ok(rec) = rec else {
            stats.rows_rejected += 1;
            continue;
        };
        let Some(timestamp) = rec.get(date_i).and_then(parse_date) else {
            stats.rows_rejected += 1;
            continue;
        };
        let value = rec.get(price_i).and_then(parse_price);
        if value.is_none() {
            stats.values_absent += 1;
        }
        stats.rows_accepted += 1;
        points.push(TimePoint::new(timestamp, value));
    }

    tracing::debug!(
        rows_read = stats.rows_read,
        rows_rejected = stats.rows_rejected,
        values_absent = stats.values_absent,
        "parsed gas price table"
    );

    Ok(Ingested {
        data: RawSeries::new(points),
        stats,
    })
}

pub fn parse_ev_csv_file(path: &Path) -> Result<Ingested<EventSeries>, CsvIngestError> {
    let src = read_file(path)?;
    parse_ev_csv_str(&src)
}

/// Parse an EV registration table from memory. Empty input yields an empty
/// series.
pub fn parse_ev_csv_str(src: &str) -> Result<Ingested<EventSeries>, CsvIngestError> {
    let mut rdr = reader(src.as_bytes());
    let Some((date_i, name_i)) = resolve_columns(&mut rdr, EV_HEADERS)? else {
        return Ok(Ingested {
            data: EventSeries::default(),
            stats: IngestStats::default(),
        });
    };

    let mut stats = IngestStats::default();
    let mut dates = Vec::new();
    for rec in rdr.records() {
        stats.rows_read += 1;
        let Ok(rec) = rec else {
            stats.rows_rejected += 1;
            continue;
        };
        let has_name = rec.get(name_i).is_some_and(|n| !n.trim().is_empty());
        match rec.get(date_i).and_then(parse_date) {
            Some(date) if has_name => {
                stats.rows_accepted += 1;
                dates.push(date);
            }
            _ => stats.rows_rejected += 1,
        }
    }

    tracing::debug!(
        rows_read = stats.rows_read,
        rows_rejected = stats.rows_rejected,
        "parsed EV registration table"
    );

    Ok(Ingested {
        data: EventSeries::new(dates),
        stats,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, CsvIngestError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| CsvIngestError::Io(format!("open '{}': {e}", path.display())))?;
    let mut buf = String::new();
    file.read_to_string(&mut buf)
        .map_err(|e| CsvIngestError::Io(format!("read '{}': {e}", path.display())))?;
    Ok(buf)
}

fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes)
}

/// Lowercase and collapse internal whitespace so `Prices  (Dollars` and
/// `prices (dollars` compare equal.
fn normalize_header(h: &str) -> String {
    h.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Locate the first accepted header pair. `Ok(None)` means the input has no
/// header row at all (empty source).
fn resolve_columns(
    rdr: &mut csv::Reader<&[u8]>,
    candidates: &[(&str, &str)],
) -> Result<Option<(usize, usize)>, CsvIngestError> {
    let headers = rdr
        .headers()
        .map_err(|e| CsvIngestError::Io(format!("header row: {e}")))?;
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Ok(None);
    }

    let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
    let find = |name: &str| {
        let want = normalize_header(name);
        normalized.iter().position(|h| *h == want)
    };

    for (a, b) in candidates {
        if let (Some(ai), Some(bi)) = (find(a), find(b)) {
            return Ok(Some((ai, bi)));
        }
    }

    let expected = candidates
        .iter()
        .map(|(a, b)| format!("['{a}', '{b}']"))
        .collect::<Vec<_>>()
        .join(" or ");
    Err(CsvIngestError::MissingHeader(expected))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
