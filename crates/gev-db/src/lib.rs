use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use gev_reconcile::PersistRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::Row;

pub use sqlx::sqlite::SqlitePool;

pub const ENV_DB_URL: &str = "GEV_DATABASE_URL";

/// Connect to SQLite, creating the database file if it does not exist.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid sqlite url: {url}"))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .context("failed to connect to SQLite")?;

    Ok(pool)
}

/// Connect using GEV_DATABASE_URL.
pub async fn connect_from_env() -> Result<SqlitePool> {
    let url = std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;
    connect(&url).await
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_merged_table: bool,
    /// Row count of merged_data, 0 when the table does not exist yet.
    pub merged_rows: i64,
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &SqlitePool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    let (tables,): (i64,) = sqlx::query_as::<_, (i64,)>(
        "select count(*) from sqlite_master where type = 'table' and name = 'merged_data'",
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;
    let has_merged_table = tables > 0;

    let merged_rows = if has_merged_table {
        let (n,): (i64,) = sqlx::query_as::<_, (i64,)>("select count(*) from merged_data")
            .fetch_one(pool)
            .await
            .context("status row-count query failed")?;
        n
    } else {
        0
    };

    Ok(DbStatus {
        ok: one == 1,
        has_merged_table,
        merged_rows,
    })
}

/// Replace the whole merged_data table with `rows` in one transaction.
///
/// Either every row is written or the previous contents stay untouched.
pub async fn replace_merged_rows(pool: &SqlitePool, rows: &[PersistRow]) -> Result<usize> {
    let mut tx = pool.begin().await.context("begin replace tx failed")?;

    sqlx::query("delete from merged_data")
        .execute(&mut *tx)
        .await
        .context("clear merged_data failed")?;

    for r in rows {
        sqlx::query("insert into merged_data (period, price, volume) values (?1, ?2, ?3)")
            .bind(r.period)
            .bind(r.price)
            .bind(r.volume)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("insert merged_data failed for period {}", r.period))?;
    }

    tx.commit().await.context("commit replace tx failed")?;
    tracing::info!(rows = rows.len(), "merged_data replaced");
    Ok(rows.len())
}

/// Load all persisted rows, ascending by period.
pub async fn load_merged_rows(pool: &SqlitePool) -> Result<Vec<PersistRow>> {
    let rows = sqlx::query("select period, price, volume from merged_data order by period asc")
        .fetch_all(pool)
        .await
        .context("load merged_data failed")?;

    rows.iter()
        .map(|r| {
            Ok(PersistRow {
                period: r
                    .try_get::<NaiveDate, _>("period")
                    .context("merged_data.period")?,
                price: r.try_get::<f64, _>("price").context("merged_data.price")?,
                volume: r.try_get::<i64, _>("volume").context("merged_data.volume")?,
            })
        })
        .collect()
}
