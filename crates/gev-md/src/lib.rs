//! gev-md
//!
//! Source ingestion for the reconciliation pipeline.
//!
//! This crate owns the read side only: CSV tables in, [`gev_reconcile::RawSeries`]
//! and [`gev_reconcile::EventSeries`] out, plus year-range cropping. It does
//! **not** aggregate, merge, write artifacts or touch the database.

pub mod crop;
pub mod dates;
pub mod ingest_csv;

pub use crop::{crop_events, crop_series, YearRange};
pub use dates::{parse_date, parse_price};
pub use ingest_csv::{
    parse_ev_csv_file, parse_ev_csv_str, parse_gas_csv_file, parse_gas_csv_str, CsvIngestError,
    IngestStats, Ingested,
};
