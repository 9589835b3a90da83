//! store.rs: result persistence behind an opaque append/query trait.
//!
//! `MemoryStore` keeps a bounded ring in process; `JsonlStore` appends one JSON
//! object per line to a file. Both stamp the record with the save time.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::analyze::AnalysisResult;
use crate::config::{StoreKind, StoreSection};

/// A persisted result plus the timestamp the store assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub analyzed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

pub trait ResultStore: Send + Sync {
    /// Best-effort append. `false` means the record was not persisted.
    fn save(&self, result: &AnalysisResult) -> bool;

    /// Up to `limit` records, newest first.
    fn load_recent(&self, limit: usize) -> Vec<StoredResult>;

    fn name(&self) -> &'static str;
}

pub fn build_store(cfg: &StoreSection) -> anyhow::Result<Arc<dyn ResultStore>> {
    match cfg.kind {
        StoreKind::Memory => Ok(Arc::new(MemoryStore::with_capacity(cfg.capacity))),
        StoreKind::Jsonl => {
            let path = cfg
                .path
                .clone()
                .context("jsonl store requires a path")?;
            Ok(Arc::new(JsonlStore::open(path)?))
        }
    }
}

// ------------------------------------------------------------
// In-memory ring
// ------------------------------------------------------------

#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Vec<StoredResult>>,
    cap: usize,
}

impl MemoryStore {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 100_000);
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(10_000))),
            cap,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultStore for MemoryStore {
    fn save(&self, result: &AnalysisResult) -> bool {
        let entry = StoredResult {
            analyzed_at: Utc::now(),
            result: result.clone(),
        };
        let Ok(mut v) = self.inner.lock() else {
            warn!("memory store mutex poisoned");
            return false;
        };
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
        true
    }

    fn load_recent(&self, limit: usize) -> Vec<StoredResult> {
        let Ok(v) = self.inner.lock() else {
            warn!("memory store mutex poisoned");
            return Vec::new();
        };
        v.iter().rev().take(limit).cloned().collect()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// ------------------------------------------------------------
// JSON-lines file
// ------------------------------------------------------------

#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    // serializes appends from concurrent requests
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("create store dir {}", dir.display()))?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &StoredResult) -> anyhow::Result<()> {
        let line = serde_json::to_string(entry).context("serialize result")?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("jsonl store lock poisoned"))?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        writeln!(f, "{line}").context("append result")?;
        Ok(())
    }
}

impl ResultStore for JsonlStore {
    fn save(&self, result: &AnalysisResult) -> bool {
        let entry = StoredResult {
            analyzed_at: Utc::now(),
            result: result.clone(),
        };
        match self.append(&entry) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = ?e, path = %self.path.display(), "failed to persist analysis result");
                false
            }
        }
    }

    fn load_recent(&self, limit: usize) -> Vec<StoredResult> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(error = ?e, path = %self.path.display(), "failed to read result store");
                return Vec::new();
            }
        };
        // Skip lines that don't parse (e.g. a torn last write).
        raw.lines()
            .rev()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str::<StoredResult>(l).ok())
            .take(limit)
            .collect()
    }

    fn name(&self) -> &'static str {
        "jsonl"
    }
}
