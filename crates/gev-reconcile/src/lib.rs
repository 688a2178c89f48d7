//! gev-reconcile
//!
//! Monthly reconciliation engine for a weekly gasoline price series and an
//! EV registration event series.
//!
//! Pipeline, leaf-first:
//! - [`cadence`]: flag points whose distance to the predecessor is not 7 days
//! - [`repair`]: replace flagged values from their chronological neighbours
//! - [`aggregate`]: resample to month-end buckets (mean for price, count for events)
//! - [`merge`]: outer join on the period key with missing-data bookkeeping
//! - [`coerce`]: strongly typed rows for the persistence adapter
//!
//! Deterministic, synchronous logic. The only I/O is the injected
//! [`InconsistencyLog`] sink; callers own ingestion and persistence.

pub mod aggregate;
pub mod cadence;
pub mod coerce;
pub mod journal;
pub mod merge;
pub mod repair;
mod types;

pub use aggregate::{monthly_count, monthly_mean};
pub use cadence::{find_inconsistencies, log_cadence_inconsistencies};
pub use coerce::{coerce_rows, CoercionError};
pub use journal::{FileLog, InconsistencyEntry, InconsistencyLog, MemoryLog};
pub use merge::{complete_rows, drop_empty_rows, merge_monthly, outer_join, MergeOutcome};
pub use repair::{repair_gaps, RepairPolicy};
pub use types::*;
