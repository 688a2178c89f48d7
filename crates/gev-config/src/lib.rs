use anyhow::{bail, Context, Result};
use gev_md::YearRange;
use gev_reconcile::RepairPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// JSON-pointer prefixes read by [`PipelineConfig`]. Any leaf outside these is
/// reported by [`report_unused_keys`].
pub const CONSUMED_POINTERS: &[&str] = &[
    "/inputs/gas_csv",
    "/inputs/ev_csv",
    "/range/from_year",
    "/range/to_year",
    "/outputs/gas_monthly_csv",
    "/outputs/ev_monthly_csv",
    "/outputs/merged_csv",
    "/outputs/inconsistency_log",
    "/outputs/manifest_dir",
    "/repair/policy",
    "/database/url",
];

// ---------------------------------------------------------------------------
// Typed pipeline config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub inputs: InputsConfig,
    #[serde(default = "default_range")]
    pub range: YearRange,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub repair: RepairConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputsConfig {
    pub gas_csv: PathBuf,
    pub ev_csv: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputsConfig {
    pub gas_monthly_csv: PathBuf,
    pub ev_monthly_csv: PathBuf,
    pub merged_csv: PathBuf,
    /// Truncated at run start. Its directory must already exist.
    pub inconsistency_log: PathBuf,
    #[serde(default)]
    pub manifest_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairConfig {
    #[serde(default)]
    pub policy: RepairPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// e.g. `sqlite://out/gev.db`. Persistence is skipped when absent.
    #[serde(default)]
    pub url: Option<String>,
}

fn default_range() -> YearRange {
    YearRange::new(2010, 2021)
}

impl PipelineConfig {
    pub fn from_config_json(v: &Value) -> Result<Self> {
        let cfg: PipelineConfig =
            serde_json::from_value(v.clone()).context("config does not match pipeline schema")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.range.is_valid() {
            bail!(
                "CONFIG_INVALID_RANGE: from_year={} is after to_year={}",
                self.range.from_year,
                self.range.to_year
            );
        }
        if let Some(url) = &self.database.url {
            if url.trim().is_empty() {
                bail!("CONFIG_INVALID_DATABASE: database.url is empty");
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unused-key guard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Minimal set of unused leaf pointers (sorted)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Produce an unused-key report against [`CONSUMED_POINTERS`].
/// With `UnusedKeyPolicy::Fail` an unclean report is an error.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<&str> = CONSUMED_POINTERS.iter().copied().collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|lp| !consumed.iter().any(|cp| is_prefix_pointer(cp, lp)))
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. First few: {:?}",
            report.unused_leaf_pointers.len(),
            report.unused_leaf_pointers.iter().take(12).collect::<Vec<_>>()
        );
    }

    Ok(report)
}

/// "/a/b" covers "/a/b" and "/a/b/c" but not "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    match leaf.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

// ---------------------------------------------------------------------------
// Layered loading + hashing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    pub fn pipeline(&self) -> Result<PipelineConfig> {
        PipelineConfig::from_config_json(&self.config_json)
    }
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

/// Merge YAML docs in order: earlier docs are base, later docs override.
pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        // An empty overlay document parses as null and leaves the base intact.
        (a_other, Value::Null) => a_other,
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // serde_json::Map is key-sorted without the preserve_order feature.
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
