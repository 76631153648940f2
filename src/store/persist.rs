use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};

use super::Db;

const DB_FILE: &str = "db.json";

/// Shared handle over a [`Db`]. Each call to [`Storage::transaction`] works
/// on a private copy that only replaces the live state (and `db.json`)
/// when the closure succeeds.
pub struct Storage {
    path: Option<PathBuf>,
    db: Mutex<Db>,
}

impl Storage {
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("create data dir {}", data_dir.display()))?;
        let path = data_dir.join(DB_FILE);
        let db = if path.exists() {
            let bytes = std::fs::read(&path).context("read db.json")?;
            let db: Db = serde_json::from_slice(&bytes).context("parse db.json")?;
            if db.version != 1 {
                anyhow::bail!("unsupported db.json version {}", db.version);
            }
            db
        } else {
            Db::new()
        };
        Ok(Self {
            path: Some(path),
            db: Mutex::new(db),
        })
    }

    pub fn in_memory(db: Db) -> Self {
        Self {
            path: None,
            db: Mutex::new(db),
        }
    }

    pub fn transaction<T>(&self, f: impl FnOnce(&mut Db) -> Result<T>) -> Result<T> {
        let mut live = self
            .db
            .lock()
            .map_err(|_| anyhow!("storage lock poisoned"))?;
        let mut work = live.clone();
        let out = f(&mut work)?;
        if let Some(path) = &self.path {
            let bytes = serde_json::to_vec_pretty(&work).context("serialize db")?;
            write_atomic_overwrite(path, &bytes).context("write db.json")?;
        }
        *live = work;
        Ok(out)
    }

    /// Read-only access to the live state, without the copy a transaction makes.
    pub fn read<T>(&self, f: impl FnOnce(&Db) -> Result<T>) -> Result<T> {
        let live = self
            .db
            .lock()
            .map_err(|_| anyhow!("storage lock poisoned"))?;
        f(&live)
    }

    pub fn snapshot(&self) -> Result<Db> {
        let live = self
            .db
            .lock()
            .map_err(|_| anyhow!("storage lock poisoned"))?;
        Ok(live.clone())
    }
}

pub fn write_atomic_overwrite(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    std::fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
