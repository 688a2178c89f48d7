//! Inconsistency log sink.
//!
//! Cadence breaks and missing-data merge rows are appended to one
//! line-oriented, human-readable log. The sink is passed into each
//! component explicitly; nothing here touches process-wide state.
//!
//! Line formats:
//! - `Inconsistency found: <timestamp> - <price>`
//! - `Missing data for <period>: Gas - <price-or-NIL>, EV - <volume-or-NIL>`

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDate;

use crate::types::{format_float, format_timestamp, Field, MergedRow};

/// One log record.
#[derive(Debug, Clone, PartialEq)]
pub enum InconsistencyEntry {
    /// A raw point whose distance to its predecessor is not 7 days.
    /// `value` is the value as observed, before any repair.
    Cadence {
        timestamp: NaiveDate,
        value: Option<f64>,
    },
    /// A merged row with at least one missing field.
    MissingData {
        period: NaiveDate,
        price: Field<f64>,
        volume: Field<i64>,
    },
}

impl InconsistencyEntry {
    pub fn missing_data(row: &MergedRow) -> Self {
        InconsistencyEntry::MissingData {
            period: row.period,
            price: row.price,
            volume: row.volume,
        }
    }
}

impl fmt::Display for InconsistencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InconsistencyEntry::Cadence { timestamp, value } => {
                let value = value.map(format_float).unwrap_or_else(|| "nan".to_string());
                write!(
                    f,
                    "Inconsistency found: {} - {}",
                    format_timestamp(*timestamp),
                    value
                )
            }
            InconsistencyEntry::MissingData {
                period,
                price,
                volume,
            } => write!(
                f,
                "Missing data for {}: Gas - {}, EV - {}",
                format_timestamp(*period),
                price,
                volume
            ),
        }
    }
}

/// Append-only destination for [`InconsistencyEntry`] records.
pub trait InconsistencyLog {
    fn append(&mut self, entry: &InconsistencyEntry) -> io::Result<()>;
}

impl<L: InconsistencyLog + ?Sized> InconsistencyLog for &mut L {
    fn append(&mut self, entry: &InconsistencyEntry) -> io::Result<()> {
        (**self).append(entry)
    }
}

/// File-backed log, one entry per line, flushed per entry so a run that
/// aborts later still leaves every entry written so far on disk.
///
/// Never creates missing parent directories.
#[derive(Debug)]
pub struct FileLog {
    file: File,
}

impl FileLog {
    /// Start a fresh log for a run, truncating any previous content.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self { file })
    }
}

impl InconsistencyLog for FileLog {
    fn append(&mut self, entry: &InconsistencyEntry) -> io::Result<()> {
        writeln!(self.file, "{entry}")?;
        self.file.flush()
    }
}

/// In-memory log for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    entries: Vec<InconsistencyEntry>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl InconsistencyLog for MemoryLog {
    fn append(&mut self, entry: &InconsistencyEntry) -> io::Result<()> {
        self.entries.push(entry.clone());
        Ok(())
    }
}
