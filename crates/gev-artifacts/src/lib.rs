//! gev-artifacts
//!
//! File outputs of one pipeline run: the two monthly CSVs, the merged CSV and
//! `manifest.json`. Parent directories are created on demand. The
//! inconsistency log is written by the reconcile crate and only referenced
//! here by path.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use gev_reconcile::{Field, MergedRow, MonthlyPoint};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const MANIFEST_SCHEMA_VERSION: i32 = 1;
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: i32,
    pub run_id: Uuid,
    pub config_hash: String,
    pub repair_policy: String,
    pub created_at_utc: DateTime<Utc>,
    pub counts: RunCounts,
    pub artifacts: ArtifactList,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub gas_points: usize,
    pub ev_occurrences: usize,
    pub cadence_flagged: usize,
    pub gas_months: usize,
    pub ev_months: usize,
    pub merged_rows: usize,
    pub missing_logged: usize,
    pub dropped_empty: usize,
    pub complete_rows: usize,
    /// Rows written to the database; `None` when persistence was not configured.
    pub persisted_rows: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactList {
    pub gas_monthly_csv: String,
    pub ev_monthly_csv: String,
    pub merged_csv: String,
    pub inconsistency_log: String,
}

pub struct WriteManifestArgs<'a> {
    pub manifest_dir: &'a Path,
    pub run_id: Uuid,
    pub config_hash: &'a str,
    pub repair_policy: &'a str,
    pub counts: RunCounts,
    pub artifacts: ArtifactList,
}

/// Write `<manifest_dir>/manifest.json`, overwriting any previous one.
pub fn write_run_manifest(args: WriteManifestArgs<'_>) -> Result<PathBuf> {
    fs::create_dir_all(args.manifest_dir).with_context(|| {
        format!(
            "create manifest dir failed: {}",
            args.manifest_dir.display()
        )
    })?;

    let manifest = RunManifest {
        schema_version: MANIFEST_SCHEMA_VERSION,
        run_id: args.run_id,
        config_hash: args.config_hash.to_string(),
        repair_policy: args.repair_policy.to_string(),
        created_at_utc: Utc::now(),
        counts: args.counts,
        artifacts: args.artifacts,
    };

    let manifest_path = args.manifest_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest).context("serialize manifest failed")?;
    fs::write(&manifest_path, format!("{json}\n"))
        .with_context(|| format!("write manifest failed: {}", manifest_path.display()))?;

    Ok(manifest_path)
}

pub fn read_run_manifest(path: &Path) -> Result<RunManifest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read manifest failed: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse manifest failed: {}", path.display()))
}

/// `period,price`; a month without observed prices carries the missing marker.
pub fn write_gas_monthly_csv(path: &Path, points: &[MonthlyPoint<Field<f64>>]) -> Result<()> {
    write_rows(
        path,
        &["period", "price"],
        points
            .iter()
            .map(|p| vec![format_period(p.period), p.value.to_string()]),
    )
}

/// `period,volume`
pub fn write_ev_monthly_csv(path: &Path, points: &[MonthlyPoint<i64>]) -> Result<()> {
    write_rows(
        path,
        &["period", "volume"],
        points
            .iter()
            .map(|p| vec![format_period(p.period), p.value.to_string()]),
    )
}

/// `period,price,volume`; missing cells carry the missing marker.
pub fn write_merged_csv(path: &Path, rows: &[MergedRow]) -> Result<()> {
    write_rows(
        path,
        &["period", "price", "volume"],
        rows.iter().map(|r| {
            vec![
                format_period(r.period),
                r.price.to_string(),
                r.volume.to_string(),
            ]
        }),
    )
}

fn format_period(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn write_rows<I>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    ensure_parent_dir(path)?;
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("create csv failed: {}", path.display()))?;
    w.write_record(header)
        .with_context(|| format!("write csv header failed: {}", path.display()))?;
    for row in rows {
        w.write_record(&row)
            .with_context(|| format!("write csv row failed: {}", path.display()))?;
    }
    w.flush()
        .with_context(|| format!("flush csv failed: {}", path.display()))?;
    Ok(())
}

/// Create the parent directory of `path` if it has one and it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create dir failed: {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn merged_csv_renders_missing_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("merged.csv");
        let rows = vec![
            MergedRow::new(d(2023, 1, 31), Field::Present(3.5), Field::Present(2)),
            MergedRow::new(d(2023, 2, 28), Field::Missing, Field::Present(1)),
            MergedRow::new(d(2023, 3, 31), Field::Present(4.0), Field::Missing),
        ];
        write_merged_csv(&path, &rows).unwrap();

        let body = fs::read_to_string(&path).unwrap();
        assert_eq!(
            body,
            "period,price,volume\n2023-01-31,3.5,2\n2023-02-28,NIL,1\n2023-03-31,4.0,NIL\n"
        );
    }

    #[test]
    fn monthly_csvs_have_expected_headers() {
        let dir = tempfile::tempdir().unwrap();
        let gas = dir.path().join("gas.csv");
        let ev = dir.path().join("ev.csv");
        write_gas_monthly_csv(
            &gas,
            &[
                MonthlyPoint::new(d(2023, 1, 31), Field::Present(3.6625)),
                MonthlyPoint::new(d(2023, 2, 28), Field::Missing),
            ],
        )
        .unwrap();
        write_ev_monthly_csv(&ev, &[MonthlyPoint::new(d(2023, 1, 31), 7)]).unwrap();

        assert_eq!(
            fs::read_to_string(&gas).unwrap(),
            "period,price\n2023-01-31,3.6625\n2023-02-28,NIL\n"
        );
        assert_eq!(fs::read_to_string(&ev).unwrap(), "period,volume\n2023-01-31,7\n");
    }

    #[test]
    fn empty_series_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.csv");
        write_merged_csv(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "period,price,volume\n");
    }

    #[test]
    fn manifest_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let run_id = Uuid::new_v4();
        let counts = RunCounts {
            gas_points: 10,
            merged_rows: 3,
            persisted_rows: Some(2),
            ..RunCounts::default()
        };
        let path = write_run_manifest(WriteManifestArgs {
            manifest_dir: &dir.path().join("runs"),
            run_id,
            config_hash: "abc",
            repair_policy: "cascading",
            counts,
            artifacts: ArtifactList {
                gas_monthly_csv: "gas.csv".to_string(),
                ev_monthly_csv: "ev.csv".to_string(),
                merged_csv: "merged.csv".to_string(),
                inconsistency_log: "inconsistencies.log".to_string(),
            },
        })
        .unwrap();

        let m = read_run_manifest(&path).unwrap();
        assert_eq!(m.run_id, run_id);
        assert_eq!(m.schema_version, MANIFEST_SCHEMA_VERSION);
        assert_eq!(m.counts, counts);
        assert_eq!(m.artifacts.merged_csv, "merged.csv");
    }
}
