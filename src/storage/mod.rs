//!
//! portal storage module
//! ---------------------
//! Key-value persistence used by the session store to survive restarts.
//! Values are plain strings keyed by a fixed namespace; the session module
//! decides what goes into them.
//!
//! Two backends are provided and selected by configuration:
//! - `memory`: lives as long as the process, the equivalent of a tab-scoped store.
//! - `file`: one JSON file per key under a data directory, survives restarts.
//!
//! Every operation is synchronous and local. Callers share a backend as
//! `SharedKv` (`Arc<dyn KeyValueStore>`).

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o failure on key '{key}'")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("quota exceeded writing key '{key}' (limit {limit} bytes)")]
    QuotaExceeded { key: String, limit: usize },

    #[error("failed to encode value for key '{key}': {message}")]
    Encode { key: String, message: String },

    /// The stored bytes exist but are not a usable value.
    #[error("corrupt value under key '{key}': {message}")]
    Corrupt { key: String, message: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence collaborator for the session store.
///
/// `get` returns `Ok(None)` for a missing key; `delete` of a missing key is not an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn delete(&self, key: &str) -> StorageResult<()>;
}

pub type SharedKv = Arc<dyn KeyValueStore>;

/// Which backend the session store persists through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceKind {
    Memory,
    #[default]
    File,
}

impl PersistenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersistenceKind::Memory => "memory",
            PersistenceKind::File => "file",
        }
    }
}

impl FromStr for PersistenceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "session" => Ok(PersistenceKind::Memory),
            "file" | "local" | "durable" => Ok(PersistenceKind::File),
            other => Err(format!("unknown persistence backend '{}' (expected memory or file)", other)),
        }
    }
}

impl std::fmt::Display for PersistenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the configured backend. `data_dir` is only consulted for `File`.
pub fn open_backend(kind: PersistenceKind, data_dir: &Path) -> Result<SharedKv> {
    match kind {
        PersistenceKind::Memory => Ok(Arc::new(MemoryStore::new())),
        PersistenceKind::File => {
            let store = FileStore::open(data_dir)
                .with_context(|| format!("While opening file store under {}", data_dir.display()))?;
            Ok(Arc::new(store))
        }
    }
}
