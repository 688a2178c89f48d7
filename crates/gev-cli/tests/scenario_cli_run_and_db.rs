//! CLI end to end: config-hash, run, db migrate/status/show.
//!
//! GREEN when:
//! - `config-hash` prints a 64-char hash line.
//! - `run --config` prints key=value counts and writes the merged CSV.
//! - `db show --url` lists exactly the complete rows the run persisted.
//! - `run` without `--config` is a usage error.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn write_inputs(root: &Path) {
    fs::write(
        root.join("gas.csv"),
        "timestamp,price\n2023-01-01,3.0\n2023-01-08,4.0\n2023-01-15,5.0\n2023-02-05,6.0\n",
    )
    .unwrap();
    fs::write(
        root.join("ev.csv"),
        "registration_date,vehicle_name\n2023-01-02,Model Y\n2023-03-04,Leaf\n",
    )
    .unwrap();
}

fn write_config(root: &Path, db_url: &str) -> String {
    let p = |name: &str| root.join(name).display().to_string();
    let yaml = format!(
        "inputs:\n  gas_csv: \"{}\"\n  ev_csv: \"{}\"\nrange:\n  from_year: 2023\n  to_year: 2023\n\
         outputs:\n  gas_monthly_csv: \"{}\"\n  ev_monthly_csv: \"{}\"\n  merged_csv: \"{}\"\n  inconsistency_log: \"{}\"\n\
         database:\n  url: \"{}\"\n",
        p("gas.csv"),
        p("ev.csv"),
        p("out/gas_monthly.csv"),
        p("out/ev_monthly.csv"),
        p("out/merged.csv"),
        p("inconsistencies.log"),
        db_url,
    );
    let path = root.join("pipeline.yaml");
    fs::write(&path, yaml).unwrap();
    path.display().to_string()
}

fn gev() -> Command {
    let mut cmd = Command::cargo_bin("gev-cli").unwrap();
    cmd.env_remove(gev_db::ENV_DB_URL).env("RUST_LOG", "warn");
    cmd
}

#[test]
fn config_hash_prints_hash_and_canonical_json() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_config(dir.path(), "sqlite://unused.db");

    gev()
        .args(["config-hash", &cfg])
        .assert()
        .success()
        .stdout(predicate::str::is_match("config_hash=[0-9a-f]{64}\n").unwrap())
        .stdout(predicate::str::contains("\"from_year\":2023"));
}

#[test]
fn run_then_db_show_lists_complete_rows() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_inputs(root);
    let db_url = format!("sqlite://{}", root.join("gev.db").display());
    let cfg = write_config(root, &db_url);

    gev()
        .args(["run", "--config", &cfg])
        .assert()
        .success()
        .stdout(predicate::str::contains("cadence_flagged=1\n"))
        .stdout(predicate::str::contains("merged_rows=3\n"))
        .stdout(predicate::str::contains("complete_rows=1\n"))
        .stdout(predicate::str::contains("persisted_rows=1\n"));

    assert_eq!(
        fs::read_to_string(root.join("out/merged.csv")).unwrap(),
        "period,price,volume\n2023-01-31,4.0,1\n2023-02-28,5.0,NIL\n2023-03-31,NIL,1\n"
    );

    gev()
        .args(["db", "status", "--url", &db_url])
        .assert()
        .success()
        .stdout(predicate::str::contains("has_merged_table=true merged_rows=1"));

    gev()
        .args(["db", "show", "--url", &db_url])
        .assert()
        .success()
        .stdout("period=2023-01-31 price=4.0 volume=1\nrows=1\n");
}

#[test]
fn db_migrate_creates_schema() {
    let dir = tempfile::tempdir().unwrap();
    let db_url = format!("sqlite://{}", dir.path().join("fresh.db").display());

    gev()
        .args(["db", "migrate", "--url", &db_url])
        .assert()
        .success()
        .stdout("migrations_applied=true\n");

    gev()
        .args(["db", "show", "--url", &db_url])
        .assert()
        .success()
        .stdout("rows=0\n");
}

#[test]
fn run_requires_config() {
    gev().arg("run").assert().failure();
}
