//! gev-runtime
//!
//! Wires ingestion, reconciliation, artifacts and persistence into one run.
//! [`reconcile`] is the pure in-memory part; [`run_pipeline`] adds the file
//! and database collaborators around it.

pub mod pipeline;
pub mod reconcile;

pub use pipeline::{run_pipeline, run_with_config, PipelineReport};
pub use reconcile::{reconcile, ReconcileOutcome};
