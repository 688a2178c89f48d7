//! Gap repair for flagged cadence points.
//!
//! Adopted policy, one forward pass over the flagged indices:
//! - successor exists and both neighbour values are present: mean of the two
//! - flagged point is the last one and the predecessor is present: forward-fill
//! - otherwise the value is left as is
//!
//! This is a local repair. Runs of consecutive gaps are not interpolated
//! across; each flagged point only looks at its direct neighbours.

use serde::{Deserialize, Serialize};

use crate::types::RawSeries;

/// Where the predecessor value comes from when several flagged points are
/// adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairPolicy {
    /// Use the predecessor as already repaired earlier in the same pass.
    #[default]
    Cascading,
    /// Use the values captured before the pass started.
    Snapshot,
}

impl RepairPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairPolicy::Cascading => "cascading",
            RepairPolicy::Snapshot => "snapshot",
        }
    }
}

/// Repair the values at `flagged` and return the repaired copy.
///
/// The output has the same length and timestamps as `series`; only values
/// at flagged indices may differ. Index 0 and out-of-range indices are
/// ignored.
pub fn repair_gaps(series: &RawSeries, flagged: &[usize], policy: RepairPolicy) -> RawSeries {
    let snapshot = series.values();
    let mut out = series.clone();
    let len = out.len();

    let mut ordered = flagged.to_vec();
    ordered.sort_unstable();
    ordered.dedup();

    let mut repaired = 0usize;
    for i in ordered {
        if i == 0 || i >= len {
            continue;
        }

        let prev = match policy {
            RepairPolicy::Cascading => out.points()[i - 1].value,
            RepairPolicy::Snapshot => snapshot[i - 1],
        };
        // The successor has not been visited yet in an ascending pass, so
        // both policies read it from the snapshot.
        let next = snapshot.get(i + 1).copied();

        let value = match (prev, next) {
            (Some(p), Some(Some(n))) => Some((p + n) / 2.0),
            (Some(p), None) => Some(p),
            _ => None,
        };

        if let Some(v) = value {
            out.points_mut()[i].value = Some(v);
            repaired += 1;
        }
    }

    tracing::debug!(
        flagged = flagged.len(),
        repaired,
        policy = policy.as_str(),
        "gap repair pass complete"
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimePoint;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(values: &[Option<f64>]) -> RawSeries {
        let start = d(2023, 1, 1);
        RawSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| TimePoint::new(start + chrono::Duration::days(7 * i as i64), *v))
                .collect(),
        )
    }

    #[test]
    fn interior_point_takes_neighbour_mean() {
        let s = series(&[Some(3.7), None, Some(4.0)]);
        let r = repair_gaps(&s, &[1], RepairPolicy::Cascading);
        let v = r.points()[1].value.unwrap();
        assert!((v - 3.85).abs() < 1e-12);
    }

    #[test]
    fn last_point_forward_fills() {
        let s = series(&[Some(1.0), Some(2.0), Some(9.0)]);
        let r = repair_gaps(&s, &[2], RepairPolicy::Cascading);
        assert_eq!(r.points()[2].value, Some(2.0));
    }

    #[test]
    fn index_zero_and_out_of_range_are_ignored() {
        let s = series(&[Some(1.0), Some(2.0)]);
        let r = repair_gaps(&s, &[0, 7], RepairPolicy::Cascading);
        assert_eq!(r, s);
    }

    #[test]
    fn absent_neighbour_leaves_value_unchanged() {
        let s = series(&[None, Some(5.0), Some(6.0)]);
        let r = repair_gaps(&s, &[1], RepairPolicy::Cascading);
        assert_eq!(r.points()[1].value, Some(5.0));

        let s = series(&[Some(1.0), Some(5.0), None]);
        let r = repair_gaps(&s, &[1], RepairPolicy::Cascading);
        assert_eq!(r.points()[1].value, Some(5.0));
    }

    #[test]
    fn single_point_series_is_unchanged() {
        let s = series(&[Some(3.5)]);
        assert_eq!(repair_gaps(&s, &[0], RepairPolicy::Cascading), s);
        assert_eq!(repair_gaps(&RawSeries::default(), &[1], RepairPolicy::Snapshot).len(), 0);
    }

    #[test]
    fn timestamps_and_length_are_preserved() {
        let s = series(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let r = repair_gaps(&s, &[1, 2, 3], RepairPolicy::Snapshot);
        assert_eq!(r.len(), s.len());
        for (a, b) in r.points().iter().zip(s.points()) {
            assert_eq!(a.timestamp, b.timestamp);
        }
    }

    #[test]
    fn adjacent_gaps_cascade_only_under_cascading_policy() {
        // values: 1, 10, 20, 3 with indices 1 and 2 flagged.
        let s = series(&[Some(1.0), Some(10.0), Some(20.0), Some(3.0)]);

        let c = repair_gaps(&s, &[1, 2], RepairPolicy::Cascading);
        // i=1: (1 + 20) / 2 = 10.5; i=2: (10.5 + 3) / 2 = 6.75
        assert_eq!(c.points()[1].value, Some(10.5));
        assert_eq!(c.points()[2].value, Some(6.75));

        let snap = repair_gaps(&s, &[2, 1], RepairPolicy::Snapshot);
        // i=2 uses the original 10.0: (10 + 3) / 2 = 6.5
        assert_eq!(snap.points()[1].value, Some(10.5));
        assert_eq!(snap.points()[2].value, Some(6.5));
    }

    #[test]
    fn absent_values_inside_a_run_block_the_mean() {
        let s = series(&[Some(2.0), None, None, Some(6.0)]);
        let c = repair_gaps(&s, &[1, 2], RepairPolicy::Cascading);
        // i=1: next is absent -> unchanged; i=2: prev still absent -> unchanged.
        assert_eq!(c.points()[1].value, None);
        assert_eq!(c.points()[2].value, None);

        let s = series(&[Some(2.0), Some(4.0), None, Some(6.0)]);
        let c = repair_gaps(&s, &[1, 2], RepairPolicy::Cascading);
        // i=1: next absent -> unchanged (4.0); i=2: (4 + 6) / 2 = 5
        assert_eq!(c.points()[1].value, Some(4.0));
        assert_eq!(c.points()[2].value, Some(5.0));
    }

    #[test]
    fn default_policy_is_cascading() {
        assert_eq!(RepairPolicy::default().as_str(), "cascading");
    }
}
