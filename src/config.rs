use std::env;
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = "./journal-data";

/// Runtime configuration, read from the environment with defaults.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Directory for the file-backed store's blobs.
    pub data_dir: PathBuf,
}

impl JournalConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("JOURNAL_DATA_DIR")
                .unwrap_or_else(|_| DEFAULT_DATA_DIR.into())
                .into(),
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.into(),
        }
    }
}
