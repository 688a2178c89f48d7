//! One end-to-end pipeline run driven by a loaded config.
//!
//! Step order: ingest, crop, reconcile (writes the inconsistency log),
//! artifacts, then optional persistence and the manifest. Artifacts and the
//! log are on disk before persistence starts, so a persistence failure still
//! leaves them for inspection.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gev_artifacts::{ArtifactList, RunCounts, WriteManifestArgs};
use gev_config::{report_unused_keys, LoadedConfig, PipelineConfig, UnusedKeyPolicy};
use gev_md::{crop_events, crop_series, CsvIngestError, Ingested};
use gev_reconcile::{coerce_rows, complete_rows, EventSeries, FileLog, RawSeries};
use tracing::Instrument;
use uuid::Uuid;

use crate::reconcile::{reconcile, ReconcileOutcome};

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub config_hash: String,
    pub counts: RunCounts,
    pub manifest_path: Option<PathBuf>,
    pub outcome: ReconcileOutcome,
}

/// Run the pipeline for `loaded`. Unknown config keys are warned about, not
/// rejected.
pub async fn run_pipeline(loaded: &LoadedConfig) -> Result<PipelineReport> {
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    for ptr in &report.unused_leaf_pointers {
        tracing::warn!(pointer = %ptr, "unused config key");
    }
    let cfg = loaded.pipeline()?;

    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("pipeline", run_id = %run_id);
    run_with_config(&cfg, run_id, &loaded.config_hash)
        .instrument(span)
        .await
}

pub async fn run_with_config(
    cfg: &PipelineConfig,
    run_id: Uuid,
    config_hash: &str,
) -> Result<PipelineReport> {
    tracing::info!(
        from_year = cfg.range.from_year,
        to_year = cfg.range.to_year,
        policy = cfg.repair.policy.as_str(),
        "pipeline start"
    );

    let gas = degrade_missing_header(
        gev_md::parse_gas_csv_file(&cfg.inputs.gas_csv),
        &cfg.inputs.gas_csv,
    )?;
    let ev = degrade_missing_header(
        gev_md::parse_ev_csv_file(&cfg.inputs.ev_csv),
        &cfg.inputs.ev_csv,
    )?;
    let prices: RawSeries = crop_series(&gas.data, cfg.range);
    let events: EventSeries = crop_events(&ev.data, cfg.range);
    tracing::info!(
        gas_points = prices.len(),
        gas_rejected = gas.stats.rows_rejected,
        ev_occurrences = events.len(),
        ev_rejected = ev.stats.rows_rejected,
        "ingest done"
    );

    let log_path = &cfg.outputs.inconsistency_log;
    let mut log = FileLog::create(log_path)
        .with_context(|| format!("open inconsistency log failed: {}", log_path.display()))?;
    let outcome = reconcile(&prices, &events, cfg.repair.policy, &mut log)
        .with_context(|| format!("write inconsistency log failed: {}", log_path.display()))?;

    gev_artifacts::write_gas_monthly_csv(&cfg.outputs.gas_monthly_csv, &outcome.gas_monthly)?;
    gev_artifacts::write_ev_monthly_csv(&cfg.outputs.ev_monthly_csv, &outcome.ev_monthly)?;
    gev_artifacts::write_merged_csv(&cfg.outputs.merged_csv, &outcome.merge.rows)?;
    tracing::info!(merged_csv = %cfg.outputs.merged_csv.display(), "artifacts written");

    let complete = complete_rows(&outcome.merge.rows);
    let persisted_rows = match &cfg.database.url {
        Some(url) => {
            let rows = coerce_rows(&complete).context("merged rows are not persistable")?;
            let pool = gev_db::connect(url).await?;
            gev_db::migrate(&pool).await?;
            let n = gev_db::replace_merged_rows(&pool, &rows).await?;
            pool.close().await;
            Some(n)
        }
        None => {
            tracing::info!("no database configured; persistence skipped");
            None
        }
    };

    let counts = RunCounts {
        gas_points: prices.len(),
        ev_occurrences: events.len(),
        cadence_flagged: outcome.cadence_flagged.len(),
        gas_months: outcome.gas_monthly.len(),
        ev_months: outcome.ev_monthly.len(),
        merged_rows: outcome.merge.rows.len(),
        missing_logged: outcome.merge.missing_logged,
        dropped_empty: outcome.merge.dropped_empty,
        complete_rows: complete.len(),
        persisted_rows,
    };

    let manifest_path = match &cfg.outputs.manifest_dir {
        Some(dir) => Some(gev_artifacts::write_run_manifest(WriteManifestArgs {
            manifest_dir: dir,
            run_id,
            config_hash,
            repair_policy: cfg.repair.policy.as_str(),
            counts,
            artifacts: ArtifactList {
                gas_monthly_csv: display(&cfg.outputs.gas_monthly_csv),
                ev_monthly_csv: display(&cfg.outputs.ev_monthly_csv),
                merged_csv: display(&cfg.outputs.merged_csv),
                inconsistency_log: display(log_path),
            },
        })?),
        None => None,
    };

    tracing::info!(
        merged_rows = counts.merged_rows,
        complete_rows = counts.complete_rows,
        "pipeline done"
    );

    Ok(PipelineReport {
        run_id,
        config_hash: config_hash.to_string(),
        counts,
        manifest_path,
        outcome,
    })
}

/// A source without the expected header degrades to an empty series so the
/// other source still reconciles. Unreadable files stay fatal.
fn degrade_missing_header<T: Default>(
    res: std::result::Result<Ingested<T>, CsvIngestError>,
    path: &Path,
) -> Result<Ingested<T>> {
    match res {
        Ok(v) => Ok(v),
        Err(e @ CsvIngestError::MissingHeader(_)) => {
            tracing::error!(path = %path.display(), error = %e, "source degraded to empty series");
            Ok(Ingested {
                data: T::default(),
                stats: Default::default(),
            })
        }
        Err(e) => Err(e).with_context(|| format!("ingest failed: {}", path.display())),
    }
}

fn display(p: &Path) -> String {
    p.display().to_string()
}
