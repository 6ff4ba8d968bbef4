//! Kadi persistence: named JSON tables in SQLite or a plain directory.
//! Keep code tiny and predictable.

#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use metrics::{counter, histogram};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Whole-table key/value storage. Absence is `Ok(None)`.
pub trait TableStore {
    fn put_table(&self, name: &str, body: &[u8]) -> Result<()>;
    fn get_table(&self, name: &str) -> Result<Option<Vec<u8>>>;
    fn table_names(&self) -> Result<Vec<String>>;
}

// ---- SQLite ----

const CODEC_PLAIN: &str = "json";
const CODEC_ZSTD: &str = "zstd";

/// SQLite-backed store, one row per table. Simple, synchronous.
pub struct SqliteStore {
    db: std::sync::Mutex<rusqlite::Connection>,
}

impl SqliteStore {
    pub fn open_default() -> Result<Self> {
        let path = std::env::var("KADI_DB_PATH").unwrap_or_else(|_| default_db_path());
        Self::open(&path)
    }

    pub fn open(path: &str) -> Result<Self> {
        let started = std::time::Instant::now();
        let db = rusqlite::Connection::open(path).with_context(|| format!("opening sqlite db at {}", path))?;
        db.pragma_update(None, "journal_mode", "WAL").ok();
        db.pragma_update(None, "synchronous", "NORMAL").ok();
        db.execute(
            "CREATE TABLE IF NOT EXISTS tables (
                name  TEXT PRIMARY KEY,
                ts    INTEGER NOT NULL,
                codec TEXT NOT NULL,
                body  BLOB NOT NULL
            )",
            [],
        )
        .context("creating tables table")?;
        let me = Self { db: std::sync::Mutex::new(db) };
        histogram!("persist_open_ms", started.elapsed().as_secs_f64() * 1000.0);
        Ok(me)
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, rusqlite::Connection>> {
        self.db.lock().map_err(|_| anyhow!("sqlite connection lock poisoned"))
    }

    /// Write time of a stored table, seconds since epoch.
    pub fn written_at(&self, name: &str) -> Result<Option<i64>> {
        let db = self.conn()?;
        let mut stmt = db.prepare("SELECT ts FROM tables WHERE name = ?1")?;
        let mut rows = stmt.query([name])?;
        let ts = match rows.next()? {
            Some(row) => Some(row.get(0)?),
            None => None,
        };
        Ok(ts)
    }
}

impl TableStore for SqliteStore {
    fn put_table(&self, name: &str, body: &[u8]) -> Result<()> {
        let started = std::time::Instant::now();
        let (codec, blob) = encode_body(body);
        let db = self.conn()?;
        db.execute(
            "INSERT INTO tables(name, ts, codec, body) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET ts = excluded.ts, codec = excluded.codec, body = excluded.body",
            (name, now_ts(), codec, &blob),
        )
        .with_context(|| format!("writing table {name}"))?;
        histogram!("persist_put_ms", started.elapsed().as_secs_f64() * 1000.0);
        counter!("persist_put_total", 1u64, "store" => "sqlite");
        debug!(table = name, bytes = body.len(), stored = blob.len(), codec, "table stored");
        Ok(())
    }

    fn get_table(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let started = std::time::Instant::now();
        let db = self.conn()?;
        let mut stmt = db.prepare("SELECT codec, body FROM tables WHERE name = ?1")?;
        let mut rows = stmt.query([name])?;
        let out = match rows.next()? {
            Some(row) => {
                let codec: String = row.get(0)?;
                let blob: Vec<u8> = row.get(1)?;
                Some(decode_body(&codec, blob).with_context(|| format!("decoding table {name}"))?)
            }
            None => None,
        };
        histogram!("persist_get_ms", started.elapsed().as_secs_f64() * 1000.0);
        Ok(out)
    }

    fn table_names(&self) -> Result<Vec<String>> {
        let db = self.conn()?;
        let mut stmt = db.prepare("SELECT name FROM tables ORDER BY name")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }
}

fn default_db_path() -> String {
    if let Some(home) = std::env::var_os("HOME") {
        let mut p = PathBuf::from(home);
        p.push(".kadi");
        let _ = std::fs::create_dir_all(&p);
        p.push("kadi.db");
        return p.to_string_lossy().to_string();
    }
    // Fallback to current directory
    "kadi.db".to_string()
}

pub fn now_ts() -> i64 {
    // seconds since epoch
    let now = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default();
    now.as_secs() as i64
}

fn encode_body(body: &[u8]) -> (&'static str, Vec<u8>) {
    #[cfg(feature = "zstd")]
    {
        let lvl: i32 = std::env::var("KADI_ZSTD_LEVEL").ok().and_then(|s| s.parse().ok()).unwrap_or(3);
        if let Ok(z) = zstd::encode_all(body, lvl) {
            return (CODEC_ZSTD, z);
        }
    }
    (CODEC_PLAIN, body.to_vec())
}

fn decode_body(codec: &str, blob: Vec<u8>) -> Result<Vec<u8>> {
    match codec {
        CODEC_PLAIN => Ok(blob),
        #[cfg(feature = "zstd")]
        CODEC_ZSTD => zstd::decode_all(std::io::Cursor::new(blob)).context("zstd decode"),
        #[cfg(not(feature = "zstd"))]
        CODEC_ZSTD => Err(anyhow!("table is zstd-compressed but kadi-persist was built without the zstd feature")),
        other => Err(anyhow!("unknown table codec {other:?}")),
    }
}

// ---- Directory ----

/// One `<name>.json` file per table.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn root(&self) -> &Path { &self.root }

    fn path_for(&self, name: &str) -> PathBuf { self.root.join(format!("{name}.json")) }
}

impl TableStore for DirStore {
    fn put_table(&self, name: &str, body: &[u8]) -> Result<()> {
        let started = std::time::Instant::now();
        std::fs::create_dir_all(&self.root).with_context(|| format!("creating {}", self.root.display()))?;
        let path = self.path_for(name);
        std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        histogram!("persist_put_ms", started.elapsed().as_secs_f64() * 1000.0);
        counter!("persist_put_total", 1u64, "store" => "dir");
        Ok(())
    }

    fn get_table(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let started = std::time::Instant::now();
        let path = self.path_for(name);
        let out = match std::fs::read(&path) {
            Ok(b) => Some(b),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        histogram!("persist_get_ms", started.elapsed().as_secs_f64() * 1000.0);
        Ok(out)
    }

    fn table_names(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).with_context(|| format!("listing {}", self.root.display())),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

// ---- Helpers ----

pub fn get_json<T: DeserializeOwned>(store: &dyn TableStore, name: &str) -> Result<Option<T>> {
    match store.get_table(name)? {
        Some(body) => Ok(Some(serde_json::from_slice(&body).with_context(|| format!("decoding table {name}"))?)),
        None => Ok(None),
    }
}

/// Cache first, then source. Source hits are written back to the cache.
pub fn cached_table(cache: &dyn TableStore, source: &dyn TableStore, name: &str) -> Result<Option<Vec<u8>>> {
    if let Some(body) = cache.get_table(name)? {
        counter!("persist_cache_hits_total", 1u64);
        return Ok(Some(body));
    }
    let Some(body) = source.get_table(name)? else {
        return Ok(None);
    };
    cache.put_table(name, &body)?;
    debug!(table = name, "table cached from source");
    Ok(Some(body))
}

/// Source fronted by a cache: reads go through `cached_table`, writes land in both.
pub struct ReadThrough<'a> {
    cache: &'a dyn TableStore,
    source: &'a dyn TableStore,
}

impl<'a> ReadThrough<'a> {
    pub fn new(cache: &'a dyn TableStore, source: &'a dyn TableStore) -> Self { Self { cache, source } }
}

impl TableStore for ReadThrough<'_> {
    fn put_table(&self, name: &str, body: &[u8]) -> Result<()> {
        self.source.put_table(name, body)?;
        self.cache.put_table(name, body)
    }

    fn get_table(&self, name: &str) -> Result<Option<Vec<u8>>> { cached_table(self.cache, self.source, name) }

    fn table_names(&self) -> Result<Vec<String>> { self.source.table_names() }
}
