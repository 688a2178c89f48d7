//! Outer join of the two monthly series with missing-data bookkeeping.
//!
//! Order of operations:
//! 1. full outer join on `period`; a side without the period gets [`Field::Missing`],
//!    as does a price month whose raw values were all absent
//! 2. every row with at least one missing field is appended to the log
//! 3. rows with both fields missing are dropped
//!
//! Rows with exactly one missing field stay in the merged artifact. They are
//! filtered out by [`complete_rows`] before persistence.

use std::collections::BTreeMap;
use std::io;

use chrono::NaiveDate;

use crate::journal::{InconsistencyEntry, InconsistencyLog};
use crate::types::{Field, MergedRow, MonthlyPoint};

/// Result of [`merge_monthly`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergeOutcome {
    /// Merged rows, ascending by period, none of them empty.
    pub rows: Vec<MergedRow>,
    /// Number of missing-data entries appended to the log.
    pub missing_logged: usize,
    /// Number of rows removed because both fields were missing.
    pub dropped_empty: usize,
}

impl MergeOutcome {
    /// Rows with both fields present.
    pub fn complete_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_complete()).count()
    }
}

/// Full outer join keyed by period. A period repeated within one side keeps
/// the last value seen for that side.
pub fn outer_join(
    price: &[MonthlyPoint<Field<f64>>],
    volume: &[MonthlyPoint<i64>],
) -> Vec<MergedRow> {
    let mut by_period: BTreeMap<NaiveDate, MergedRow> = BTreeMap::new();

    for p in price {
        by_period
            .entry(p.period)
            .or_insert_with(|| MergedRow::new(p.period, Field::Missing, Field::Missing))
            .price = p.value;
    }
    for v in volume {
        by_period
            .entry(v.period)
            .or_insert_with(|| MergedRow::new(v.period, Field::Missing, Field::Missing))
            .volume = Field::Present(v.value);
    }

    by_period.into_values().collect()
}

/// Remove rows where both fields are missing.
pub fn drop_empty_rows(rows: Vec<MergedRow>) -> Vec<MergedRow> {
    rows.into_iter().filter(|r| !r.is_empty()).collect()
}

/// Rows eligible for persistence: both fields present.
pub fn complete_rows(rows: &[MergedRow]) -> Vec<MergedRow> {
    rows.iter().filter(|r| r.is_complete()).copied().collect()
}

/// Join, log and filter. See the module docs for the order of operations.
pub fn merge_monthly(
    price: &[MonthlyPoint<Field<f64>>],
    volume: &[MonthlyPoint<i64>],
    log: &mut dyn InconsistencyLog,
) -> io::Result<MergeOutcome> {
    let joined = outer_join(price, volume);

    let mut missing_logged = 0;
    for row in joined.iter().filter(|r| r.has_missing()) {
        log.append(&InconsistencyEntry::missing_data(row))?;
        missing_logged += 1;
    }

    let before = joined.len();
    let rows = drop_empty_rows(joined);

    Ok(MergeOutcome {
        dropped_empty: before - rows.len(),
        rows,
        missing_logged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{monthly_count, monthly_mean};
    use crate::journal::MemoryLog;
    use crate::types::{EventSeries, RawSeries, TimePoint};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn price_point(period: NaiveDate, v: f64) -> MonthlyPoint<Field<f64>> {
        MonthlyPoint::new(period, Field::Present(v))
    }

    #[test]
    fn matching_periods_merge_without_logging() {
        let price = vec![price_point(d(2023, 1, 31), 3.5)];
        let volume = vec![MonthlyPoint::new(d(2023, 1, 31), 12)];
        let mut log = MemoryLog::new();
        let out = merge_monthly(&price, &volume, &mut log).unwrap();

        assert_eq!(
            out.rows,
            vec![MergedRow::new(d(2023, 1, 31), Field::Present(3.5), Field::Present(12))]
        );
        assert_eq!(out.missing_logged, 0);
        assert!(log.is_empty());
    }

    #[test]
    fn one_sided_periods_are_marked_logged_and_kept() {
        let price = vec![
            price_point(d(2023, 1, 31), 3.5),
            price_point(d(2023, 3, 31), 3.7),
        ];
        let volume = vec![
            MonthlyPoint::new(d(2023, 1, 31), 4),
            MonthlyPoint::new(d(2023, 2, 28), 2),
        ];
        let mut log = MemoryLog::new();
        let out = merge_monthly(&price, &volume, &mut log).unwrap();

        assert_eq!(out.rows.len(), 3);
        assert_eq!(out.rows[1].price, Field::Missing);
        assert_eq!(out.rows[2].volume, Field::Missing);
        assert_eq!(out.missing_logged, 2);
        assert_eq!(out.dropped_empty, 0);
        assert_eq!(out.complete_count(), 1);
        assert_eq!(
            log.lines(),
            vec![
                "Missing data for 2023-02-28 00:00:00: Gas - NIL, EV - 2".to_string(),
                "Missing data for 2023-03-31 00:00:00: Gas - 3.7, EV - NIL".to_string(),
            ]
        );
    }

    #[test]
    fn zero_volume_is_not_missing() {
        let price = vec![price_point(d(2023, 1, 31), 0.0)];
        let volume = vec![MonthlyPoint::new(d(2023, 1, 31), 0)];
        let mut log = MemoryLog::new();
        let out = merge_monthly(&price, &volume, &mut log).unwrap();
        assert!(out.rows[0].is_complete());
        assert!(log.is_empty());
    }

    #[test]
    fn empty_sides_produce_empty_merge() {
        let mut log = MemoryLog::new();
        let out = merge_monthly(&[], &[], &mut log).unwrap();
        assert!(out.rows.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn all_absent_price_month_without_events_is_logged_then_dropped() {
        let mut points = Vec::new();
        for (i, v) in [3.0, 3.1, 3.2, 3.3].iter().enumerate() {
            points.push(TimePoint::observed(d(2023, 2, 5 + 7 * i as u32), *v));
        }
        for day in [5, 12, 19, 26] {
            points.push(TimePoint::new(d(2023, 3, day), None));
        }
        points.push(TimePoint::observed(d(2023, 4, 2), 4.0));
        let prices = RawSeries::new(points);
        let events = EventSeries::new(vec![d(2023, 2, 1), d(2023, 4, 3)]);

        let price = monthly_mean(&prices);
        assert_eq!(price.len(), 3);
        assert_eq!(price[1], MonthlyPoint::new(d(2023, 3, 31), Field::Missing));

        let mut log = MemoryLog::new();
        let out = merge_monthly(&price, &monthly_count(&events), &mut log).unwrap();

        assert_eq!(
            log.lines(),
            vec!["Missing data for 2023-03-31 00:00:00: Gas - NIL, EV - NIL".to_string()]
        );
        assert_eq!(out.missing_logged, 1);
        assert_eq!(out.dropped_empty, 1);
        let periods: Vec<_> = out.rows.iter().map(|r| r.period).collect();
        assert_eq!(periods, vec![d(2023, 2, 28), d(2023, 4, 30)]);
        assert_eq!(out.complete_count(), 2);
    }

    #[test]
    fn all_absent_price_month_with_events_is_kept_one_sided() {
        let price = vec![MonthlyPoint::new(d(2023, 3, 31), Field::Missing)];
        let volume = vec![MonthlyPoint::new(d(2023, 3, 31), 2)];
        let mut log = MemoryLog::new();
        let out = merge_monthly(&price, &volume, &mut log).unwrap();

        assert_eq!(
            out.rows,
            vec![MergedRow::new(d(2023, 3, 31), Field::Missing, Field::Present(2))]
        );
        assert_eq!(out.dropped_empty, 0);
        assert_eq!(
            log.lines(),
            vec!["Missing data for 2023-03-31 00:00:00: Gas - NIL, EV - 2".to_string()]
        );
    }

    #[test]
    fn drop_empty_rows_removes_only_fully_missing() {
        let rows = vec![
            MergedRow::new(d(2023, 1, 31), Field::Missing, Field::Missing),
            MergedRow::new(d(2023, 2, 28), Field::Present(1.0), Field::Missing),
            MergedRow::new(d(2023, 3, 31), Field::Missing, Field::Present(1)),
        ];
        let kept = drop_empty_rows(rows);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].period, d(2023, 2, 28));
    }

    #[test]
    fn complete_rows_excludes_partial_rows() {
        let rows = vec![
            MergedRow::new(d(2023, 1, 31), Field::Present(3.0), Field::Present(1)),
            MergedRow::new(d(2023, 2, 28), Field::Present(1.0), Field::Missing),
        ];
        assert_eq!(complete_rows(&rows), vec![rows[0]]);
    }

    #[test]
    fn output_is_sorted_regardless_of_input_order() {
        let price = vec![
            price_point(d(2023, 3, 31), 3.0),
            price_point(d(2023, 1, 31), 1.0),
        ];
        let volume = vec![MonthlyPoint::new(d(2023, 2, 28), 2)];
        let rows = outer_join(&price, &volume);
        let periods: Vec<_> = rows.iter().map(|r| r.period).collect();
        assert_eq!(periods, vec![d(2023, 1, 31), d(2023, 2, 28), d(2023, 3, 31)]);
    }
}
