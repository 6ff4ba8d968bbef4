//! Manifest snapshot loader: one JSON file per table in a directory.

use std::path::Path;

use kadi_core::{PlugSetDefinition, RawItem, SandboxPerkDefinition, StatDefinition, StatGroupDefinition};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ManifestError;

pub const ITEM_TABLE: &str = "DestinyInventoryItemDefinition";
pub const STAT_TABLE: &str = "DestinyStatDefinition";
pub const STAT_GROUP_TABLE: &str = "DestinyStatGroupDefinition";
pub const PLUG_SET_TABLE: &str = "DestinyPlugSetDefinition";
pub const SANDBOX_PERK_TABLE: &str = "DestinySandboxPerkDefinition";

/// All tables the pipeline needs, fully loaded.
#[derive(Debug, Clone, Default)]
pub struct ManifestTables {
    pub items: Vec<RawItem>,
    pub stats: Vec<StatDefinition>,
    pub stat_groups: Vec<StatGroupDefinition>,
    pub plug_sets: Vec<PlugSetDefinition>,
    pub sandbox_perks: Vec<SandboxPerkDefinition>,
}

impl ManifestTables {
    /// Read every table from `dir` sequentially. Any failure aborts the load.
    pub async fn load_dir(dir: &Path) -> Result<Self, ManifestError> {
        let started = std::time::Instant::now();
        let tables = Self {
            items: load_table(dir, ITEM_TABLE).await?,
            stats: load_table(dir, STAT_TABLE).await?,
            stat_groups: load_table(dir, STAT_GROUP_TABLE).await?,
            plug_sets: load_table(dir, PLUG_SET_TABLE).await?,
            sandbox_perks: load_table(dir, SANDBOX_PERK_TABLE).await?,
        };
        info!(
            dir = %dir.display(),
            items = tables.items.len(),
            stats = tables.stats.len(),
            stat_groups = tables.stat_groups.len(),
            plug_sets = tables.plug_sets.len(),
            sandbox_perks = tables.sandbox_perks.len(),
            took_ms = started.elapsed().as_millis() as u64,
            "manifest loaded"
        );
        Ok(tables)
    }
}

async fn load_table<T: DeserializeOwned>(dir: &Path, table: &'static str) -> Result<Vec<T>, ManifestError> {
    let path = dir.join(format!("{table}.json"));
    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ManifestError::MissingTable(table)),
        Err(e) => return Err(ManifestError::Io { path: path.display().to_string(), source: e }),
    };
    let rows = parse_table(table, &bytes)?;
    debug!(table, rows = rows.len(), bytes = bytes.len(), "table parsed");
    Ok(rows)
}

/// Accepts the component format (object keyed by hash) or a plain array.
/// Object rows come out in ascending numeric key order; non-numeric keys follow.
pub fn parse_table<T: DeserializeOwned>(table: &'static str, bytes: &[u8]) -> Result<Vec<T>, ManifestError> {
    let json = |source| ManifestError::Json { table, source };
    let v: Value = serde_json::from_slice(bytes).map_err(json)?;
    match v {
        Value::Object(map) => {
            let mut rows: Vec<(Option<u32>, Value)> = map.into_iter().map(|(k, v)| (k.parse::<u32>().ok(), v)).collect();
            rows.sort_by_key(|(k, _)| k.map_or((1, 0), |n| (0, n)));
            rows.into_iter().map(|(_, v)| serde_json::from_value(v)).collect::<Result<_, _>>().map_err(json)
        }
        other => serde_json::from_value(other).map_err(json),
    }
}
