//! Year-range cropping applied before reconciliation.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use gev_reconcile::{EventSeries, RawSeries};

/// Inclusive calendar-year window, e.g. 2010..=2021.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub from_year: i32,
    pub to_year: i32,
}

impl YearRange {
    pub fn new(from_year: i32, to_year: i32) -> Self {
        Self { from_year, to_year }
    }

    pub fn is_valid(&self) -> bool {
        self.from_year <= self.to_year
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        (self.from_year..=self.to_year).contains(&d.year())
    }
}

pub fn crop_series(series: &RawSeries, range: YearRange) -> RawSeries {
    RawSeries::new(
        series
            .points()
            .iter()
            .filter(|p| range.contains(p.timestamp))
            .copied()
            .collect(),
    )
}

pub fn crop_events(events: &EventSeries, range: YearRange) -> EventSeries {
    EventSeries::new(
        events
            .occurrences()
            .iter()
            .filter(|d| range.contains(**d))
            .copied()
            .collect(),
    )
}
