//! Month-end resampling.
//!
//! Every timestamp maps to the last day of its month. Points are grouped in a
//! `BTreeMap` keyed by that period and emitted in ascending period order, so
//! the output does not depend on the order rows arrived in.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{month_end, EventSeries, Field, MonthlyPoint, RawSeries};

#[derive(Debug, Default)]
struct MeanAcc {
    sum: f64,
    observed: usize,
    rows: usize,
}

/// Monthly arithmetic mean of the present values.
///
/// Absent and NaN values are skipped. Every month with at least one raw row
/// gets an entry; a month whose rows are all absent carries
/// [`Field::Missing`] so the merge can log it. Empty input yields an empty
/// result.
pub fn monthly_mean(series: &RawSeries) -> Vec<MonthlyPoint<Field<f64>>> {
    let mut buckets: BTreeMap<NaiveDate, MeanAcc> = BTreeMap::new();
    for p in series.points() {
        let acc = buckets.entry(month_end(p.timestamp)).or_default();
        acc.rows += 1;
        if let Some(v) = p.value.filter(|v| !v.is_nan()) {
            acc.sum += v;
            acc.observed += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(period, acc)| {
            if acc.observed == 0 {
                tracing::warn!(
                    period = %period,
                    rows = acc.rows,
                    "no observed values in month; monthly price marked missing"
                );
                return MonthlyPoint::new(period, Field::Missing);
            }
            MonthlyPoint::new(period, Field::Present(acc.sum / acc.observed as f64))
        })
        .collect()
}

/// Monthly count of occurrences. Volume is the number of raw rows in the
/// month, not a sum of any field.
pub fn monthly_count(events: &EventSeries) -> Vec<MonthlyPoint<i64>> {
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for d in events.occurrences() {
        *buckets.entry(month_end(*d)).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|(period, n)| MonthlyPoint::new(period, n))
        .collect()
}
