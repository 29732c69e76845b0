use std::collections::HashMap;

use parking_lot::RwLock;

use super::{KeyValueStore, StorageError, StorageResult};

/// In-process key-value store. Contents are lost when the process exits.
///
/// An optional quota caps the byte length of any single value, mirroring the
/// per-origin limits of browser storage; writes over the limit fail without
/// touching the existing value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_quota(limit: usize) -> Self {
        Self { map: RwLock::new(HashMap::new()), quota: Some(limit) }
    }

    pub fn len(&self) -> usize { self.map.read().len() }

    pub fn is_empty(&self) -> bool { self.map.read().is_empty() }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(limit) = self.quota {
            if value.len() > limit {
                return Err(StorageError::QuotaExceeded { key: key.to_string(), limit });
            }
        }
        self.map.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.map.write().remove(key);
        Ok(())
    }
}
