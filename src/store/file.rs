use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::JournalConfig;
use crate::errors::JournalError;
use crate::store::KeyValueStore;

/// File-backed store: one `<key>.json` file per blob under a data directory.
///
/// The natural stand-in for browser local storage when the journal runs
/// outside a browser. Writes replace the whole file, mirroring the
/// last-writer-wins blob semantics.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Open the store at the environment-configured data directory.
    pub fn from_env() -> Result<Self, JournalError> {
        Self::open(JournalConfig::from_env().data_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        match fs::read_to_string(self.blob_path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), JournalError> {
        let path = self.blob_path(key);
        fs::write(&path, value)?;
        tracing::debug!(key, bytes = value.len(), "Blob written");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), JournalError> {
        match fs::remove_file(self.blob_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, JournalError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
