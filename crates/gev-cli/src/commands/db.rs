use anyhow::Result;
use gev_db::SqlitePool;
use gev_reconcile::format_float;

/// Connect with an explicit `--url`, else GEV_DATABASE_URL.
pub async fn connect(url: Option<&str>) -> Result<SqlitePool> {
    match url {
        Some(u) => gev_db::connect(u).await,
        None => gev_db::connect_from_env().await,
    }
}

pub async fn status(pool: &SqlitePool) -> Result<()> {
    let s = gev_db::status(pool).await?;
    println!(
        "db_ok={} has_merged_table={} merged_rows={}",
        s.ok, s.has_merged_table, s.merged_rows
    );
    Ok(())
}

pub async fn show(pool: &SqlitePool) -> Result<()> {
    let rows = gev_db::load_merged_rows(pool).await?;
    for r in &rows {
        println!(
            "period={} price={} volume={}",
            r.period,
            format_float(r.price),
            r.volume
        );
    }
    println!("rows={}", rows.len());
    Ok(())
}
