//! Synchronous composition of the reconcile stages for one run.

use std::io;

use gev_reconcile::{
    find_inconsistencies, log_cadence_inconsistencies, merge_monthly, monthly_count,
    monthly_mean, repair_gaps, EventSeries, Field, InconsistencyLog, MergeOutcome, MonthlyPoint,
    RawSeries, RepairPolicy,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    /// Indices flagged by the cadence check, in the raw series.
    pub cadence_flagged: Vec<usize>,
    pub repaired: RawSeries,
    pub gas_monthly: Vec<MonthlyPoint<Field<f64>>>,
    pub ev_monthly: Vec<MonthlyPoint<i64>>,
    pub merge: MergeOutcome,
}

/// Cadence check, cadence log, repair, monthly aggregation, merge.
///
/// All cadence entries reach `log` before any missing-data entry. The first
/// log write failure aborts the run.
pub fn reconcile(
    prices: &RawSeries,
    events: &EventSeries,
    policy: RepairPolicy,
    log: &mut dyn InconsistencyLog,
) -> io::Result<ReconcileOutcome> {
    let cadence_flagged = find_inconsistencies(prices);
    log_cadence_inconsistencies(prices, &cadence_flagged, log)?;
    tracing::info!(
        points = prices.len(),
        flagged = cadence_flagged.len(),
        "cadence check done"
    );

    let repaired = repair_gaps(prices, &cadence_flagged, policy);

    let gas_monthly = monthly_mean(&repaired);
    let ev_monthly = monthly_count(events);
    tracing::info!(
        gas_months = gas_monthly.len(),
        ev_months = ev_monthly.len(),
        "monthly aggregation done"
    );

    let merge = merge_monthly(&gas_monthly, &ev_monthly, log)?;
    tracing::info!(
        rows = merge.rows.len(),
        missing_logged = merge.missing_logged,
        dropped_empty = merge.dropped_empty,
        "merge done"
    );

    Ok(ReconcileOutcome {
        cadence_flagged,
        repaired,
        gas_monthly,
        ev_monthly,
        merge,
    })
}
