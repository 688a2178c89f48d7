//! Weekly cadence validation.
//!
//! A point is inconsistent when the day distance to its predecessor is not
//! exactly [`CADENCE_DAYS`]. The first point has no predecessor and is never
//! flagged. Detection and logging are separate calls so the caller decides
//! the composition.

use std::io;

use crate::journal::{InconsistencyEntry, InconsistencyLog};
use crate::types::{RawSeries, CADENCE_DAYS};

/// Indices `i >= 1` where `ts[i] - ts[i-1] != 7 days`, ascending.
pub fn find_inconsistencies(series: &RawSeries) -> Vec<usize> {
    series
        .points()
        .windows(2)
        .enumerate()
        .filter(|(_, w)| (w[1].timestamp - w[0].timestamp).num_days() != CADENCE_DAYS)
        .map(|(i, _)| i + 1)
        .collect()
}

/// Append one cadence entry per flagged index, in ascending timestamp order,
/// with the value as observed (before repair). Out-of-range indices are
/// ignored.
pub fn log_cadence_inconsistencies(
    series: &RawSeries,
    flagged: &[usize],
    log: &mut dyn InconsistencyLog,
) -> io::Result<usize> {
    let mut ordered = flagged.to_vec();
    ordered.sort_unstable();
    ordered.dedup();

    let mut written = 0;
    for i in ordered {
        let Some(p) = series.points().get(i) else {
            continue;
        };
        log.append(&InconsistencyEntry::Cadence {
            timestamp: p.timestamp,
            value: p.value,
        })?;
        written += 1;
    }
    Ok(written)
}
