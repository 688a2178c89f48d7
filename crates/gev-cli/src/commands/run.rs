use anyhow::Result;

/// `gev run --config ...`
pub async fn run(config_paths: &[String]) -> Result<()> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = gev_config::load_layered_yaml(&path_refs)?;

    let report = gev_runtime::run_pipeline(&loaded).await?;
    let c = &report.counts;

    println!("run_id={}", report.run_id);
    println!("config_hash={}", report.config_hash);
    println!("gas_points={}", c.gas_points);
    println!("ev_occurrences={}", c.ev_occurrences);
    println!("cadence_flagged={}", c.cadence_flagged);
    println!("gas_months={}", c.gas_months);
    println!("ev_months={}", c.ev_months);
    println!("merged_rows={}", c.merged_rows);
    println!("missing_logged={}", c.missing_logged);
    println!("dropped_empty={}", c.dropped_empty);
    println!("complete_rows={}", c.complete_rows);
    match c.persisted_rows {
        Some(n) => println!("persisted_rows={n}"),
        None => println!("persisted_rows=SKIPPED"),
    }
    if let Some(p) = &report.manifest_path {
        println!("manifest={}", p.display());
    }
    Ok(())
}
