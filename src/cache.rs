// src/cache.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};
use tracing::{info, warn};

use crate::table::{load_incidents, IncidentTable};

/// Identity of a source file at the time it was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceKey {
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
    pub len: Option<u64>,
}

impl SourceKey {
    /// Stat `path`. A missing file still gets a key, with no signature.
    pub fn stat(path: &Path) -> Self {
        let meta = fs::metadata(path);
        Self {
            path: path.to_path_buf(),
            modified: meta
                .as_ref()
                .ok()
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from),
            len: meta.as_ref().ok().map(|m| m.len()),
        }
    }
}

struct Entry {
    key: SourceKey,
    table: Arc<IncidentTable>,
}

/// Holds the one loaded incident table for the process.
///
/// The table is loaded on first request and shared read-only afterwards. A
/// request for a different path replaces it; a change to the file on disk does
/// not, until [`TableCache::reload`] is called.
pub struct TableCache {
    slot: RwLock<Option<Entry>>,
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TableCache {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    pub fn get_or_load(&self, path: &Path) -> Arc<IncidentTable> {
        // Fast path: same source already loaded.
        {
            let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = slot.as_ref() {
                if entry.key.path == path {
                    return Arc::clone(&entry.table);
                }
            }
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded it while we waited.
        if let Some(entry) = slot.as_ref() {
            if entry.key.path == path {
                return Arc::clone(&entry.table);
            }
            info!(
                old = %entry.key.path.display(),
                new = %path.display(),
                "source path changed; replacing cached table"
            );
        }
        let entry = load_entry(path);
        let table = Arc::clone(&entry.table);
        *slot = Some(entry);
        table
    }

    /// Drop whatever is cached and load `path` again.
    pub fn reload(&self, path: &Path) -> Arc<IncidentTable> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        let entry = load_entry(path);
        let table = Arc::clone(&entry.table);
        *slot = Some(entry);
        table
    }

    /// Key of the cached source, if anything is loaded.
    pub fn source(&self) -> Option<SourceKey> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(|e| e.key.clone())
    }

    /// Whether the cached file's signature has changed on disk since it was
    /// loaded. Reported only; the cache keeps serving the loaded table.
    pub fn is_stale(&self) -> Result<bool> {
        let key = self.source().context("nothing loaded")?;
        let current = SourceKey::stat(&key.path);
        if current != key {
            warn!(path = %key.path.display(), "cached incident table is stale");
        }
        Ok(current != key)
    }
}

fn load_entry(path: &Path) -> Entry {
    let key = SourceKey::stat(path);
    let table = Arc::new(load_incidents(path));
    Entry { key, table }
}

static INCIDENTS: Lazy<TableCache> = Lazy::new(TableCache::new);

/// The process-wide cache.
pub fn global() -> &'static TableCache {
    &INCIDENTS
}
