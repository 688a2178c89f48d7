//! Coercion of merged rows into [`PersistRow`] for the persistence adapter.
//!
//! The persisted schema needs both fields present: price as a finite float,
//! volume as a non-negative integer. Anything else is a typed error that
//! names the period; nothing is dropped silently here.

use std::fmt;

use chrono::NaiveDate;

use crate::types::{Field, MergedRow, PersistRow};

/// Errors produced while coercing merged rows.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercionError {
    /// Price cell carries the missing marker.
    MissingPrice { period: NaiveDate },
    /// Volume cell carries the missing marker.
    MissingVolume { period: NaiveDate },
    /// Price is NaN or infinite.
    NonFinitePrice { period: NaiveDate, price: f64 },
    /// Volume is negative (a count cannot be).
    NegativeVolume { period: NaiveDate, volume: i64 },
}

impl CoercionError {
    pub fn period(&self) -> NaiveDate {
        match self {
            CoercionError::MissingPrice { period }
            | CoercionError::MissingVolume { period }
            | CoercionError::NonFinitePrice { period, .. }
            | CoercionError::NegativeVolume { period, .. } => *period,
        }
    }
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionError::MissingPrice { period } => {
                write!(f, "period {period}: price is missing and cannot be persisted")
            }
            CoercionError::MissingVolume { period } => {
                write!(f, "period {period}: volume is missing and cannot be persisted")
            }
            CoercionError::NonFinitePrice { period, price } => {
                write!(f, "period {period}: price must be finite, got {price}")
            }
            CoercionError::NegativeVolume { period, volume } => {
                write!(f, "period {period}: volume must be >= 0, got {volume}")
            }
        }
    }
}

impl std::error::Error for CoercionError {}

impl TryFrom<&MergedRow> for PersistRow {
    type Error = CoercionError;

    fn try_from(row: &MergedRow) -> Result<Self, Self::Error> {
        let period = row.period;
        let price = match row.price {
            Field::Present(p) if p.is_finite() => p,
            Field::Present(p) => return Err(CoercionError::NonFinitePrice { period, price: p }),
            Field::Missing => return Err(CoercionError::MissingPrice { period }),
        };
        let volume = match row.volume {
            Field::Present(v) if v >= 0 => v,
            Field::Present(v) => return Err(CoercionError::NegativeVolume { period, volume: v }),
            Field::Missing => return Err(CoercionError::MissingVolume { period }),
        };
        Ok(PersistRow {
            period,
            price,
            volume,
        })
    }
}

/// Coerce every row, failing on the first row that cannot be persisted.
///
/// Callers exclude partial rows first (see [`crate::complete_rows`]); a
/// missing marker reaching this point is an error.
pub fn coerce_rows(rows: &[MergedRow]) -> Result<Vec<PersistRow>, CoercionError> {
    rows.iter().map(PersistRow::try_from).collect()
}
