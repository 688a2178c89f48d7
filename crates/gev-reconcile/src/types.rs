use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Expected distance in days between consecutive points of a weekly series.
pub const CADENCE_DAYS: i64 = 7;

/// Rendering of [`Field::Missing`] in logs and CSV artifacts.
pub const MISSING_MARKER: &str = "NIL";

/// One observation of a raw series. `value` is `None` when the source cell
/// was empty or could not be parsed as a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub timestamp: NaiveDate,
    pub value: Option<f64>,
}

impl TimePoint {
    pub fn new(timestamp: NaiveDate, value: Option<f64>) -> Self {
        Self { timestamp, value }
    }

    pub fn observed(timestamp: NaiveDate, value: f64) -> Self {
        Self {
            timestamp,
            value: Some(value),
        }
    }
}

/// A weekly-sampled series, always held in ascending timestamp order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSeries {
    points: Vec<TimePoint>,
}

impl RawSeries {
    /// Build a series from points in any order. The sort is stable, so
    /// duplicate timestamps keep their input order.
    pub fn new(mut points: Vec<TimePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self { points }
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub(crate) fn points_mut(&mut self) -> &mut [TimePoint] {
        &mut self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Occurrence dates of the event source (one entry per EV registration).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventSeries {
    occurrences: Vec<NaiveDate>,
}

impl EventSeries {
    pub fn new(mut occurrences: Vec<NaiveDate>) -> Self {
        occurrences.sort();
        Self { occurrences }
    }

    pub fn occurrences(&self) -> &[NaiveDate] {
        &self.occurrences
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

/// Canonical month key: the last calendar day of the month containing `d`.
pub fn month_end(d: NaiveDate) -> NaiveDate {
    let (year, month) = if d.month() == 12 {
        (d.year() + 1, 1)
    } else {
        (d.year(), d.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(d)
}

/// One aggregated month. `period` is always a month-end date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint<T> {
    pub period: NaiveDate,
    pub value: T,
}

impl<T> MonthlyPoint<T> {
    pub fn new(period: NaiveDate, value: T) -> Self {
        Self { period, value }
    }
}

/// A merged cell: either an observed value or the missing marker.
///
/// Kept distinct from every numeric value, zero included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<T> {
    Present(T),
    Missing,
}

impl<T> Field<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }

    pub fn is_present(&self) -> bool {
        !self.is_missing()
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Field::Present(v),
            None => Field::Missing,
        }
    }
}

impl fmt::Display for Field<f64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Present(v) => f.write_str(&format_float(*v)),
            Field::Missing => f.write_str(MISSING_MARKER),
        }
    }
}

impl fmt::Display for Field<i64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Present(v) => write!(f, "{v}"),
            Field::Missing => f.write_str(MISSING_MARKER),
        }
    }
}

/// One row of the outer join. Never both fields missing once
/// [`crate::drop_empty_rows`] has run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedRow {
    pub period: NaiveDate,
    pub price: Field<f64>,
    pub volume: Field<i64>,
}

impl MergedRow {
    pub fn new(period: NaiveDate, price: Field<f64>, volume: Field<i64>) -> Self {
        Self {
            period,
            price,
            volume,
        }
    }

    /// At least one field is missing.
    pub fn has_missing(&self) -> bool {
        self.price.is_missing() || self.volume.is_missing()
    }

    /// Both fields are present.
    pub fn is_complete(&self) -> bool {
        !self.has_missing()
    }

    /// Both fields are missing; such a row carries no information.
    pub fn is_empty(&self) -> bool {
        self.price.is_missing() && self.volume.is_missing()
    }
}

/// Strongly typed row accepted by the persistence adapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistRow {
    pub period: NaiveDate,
    pub price: f64,
    pub volume: i64,
}

/// Render a float the way the legacy log consumers expect (`4.0`, `3.85`,
/// `nan`): whole numbers keep one decimal place, everything else uses the
/// shortest round-trip representation.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// Render a date as a midnight timestamp (`2023-01-25 00:00:00`).
pub fn format_timestamp(d: NaiveDate) -> String {
    d.format("%Y-%m-%d 00:00:00").to_string()
}
