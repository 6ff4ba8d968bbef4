//! Table access for read-side commands: `--tables DIR`, optionally cached in `--db`.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use kadi_persist::{get_json, now_ts, DirStore, ReadThrough, SqliteStore};
use serde::de::DeserializeOwned;
use tracing::debug;

pub struct Tables {
    source: DirStore,
    cache: Option<SqliteStore>,
}

impl Tables {
    pub fn new(dir: PathBuf, db: Option<&Option<String>>) -> Result<Self> {
        Ok(Self { source: DirStore::new(dir), cache: open_db(db)? })
    }

    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let found = match &self.cache {
            Some(cache) => {
                if let Some(ts) = cache.written_at(name)? {
                    debug!(table = name, age_secs = now_ts() - ts, "table served from cache");
                }
                get_json(&ReadThrough::new(cache, &self.source), name)?
            }
            None => get_json(&self.source, name)?,
        };
        found.ok_or_else(|| anyhow!("table {name} not found under {}; run `kadictl transform` first", self.source.root().display()))
    }
}

/// `--db` alone uses the default location, `--db PATH` an explicit file.
pub fn open_db(db: Option<&Option<String>>) -> Result<Option<SqliteStore>> {
    match db {
        None => Ok(None),
        Some(None) => Ok(Some(SqliteStore::open_default()?)),
        Some(Some(path)) => Ok(Some(SqliteStore::open(path)?)),
    }
}
