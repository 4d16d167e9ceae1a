use std::collections::BTreeMap;

use crate::errors::JournalError;
use crate::store::KeyValueStore;

/// In-memory store backend. Used by tests and by embedders that manage
/// persistence themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), JournalError> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), JournalError> {
        self.blobs.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, JournalError> {
        Ok(self.blobs.keys().cloned().collect())
    }
}
