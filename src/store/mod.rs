pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::errors::JournalError;

/// Blob key holding the JSON-encoded trade array.
pub const TRADES_KEY: &str = "trade-journal-trades";
/// Blob key holding the JSON-encoded journal-entry array.
pub const JOURNAL_KEY: &str = "trade-journal-entries";

/// Key-value persistence boundary.
///
/// The journal stores two named JSON blobs through this interface and never
/// touches a concrete storage mechanism directly, so backends are swappable
/// (in-memory for tests, a JSON file directory for embedding).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), JournalError>;
    fn remove(&mut self, key: &str) -> Result<(), JournalError>;
    fn keys(&self) -> Result<Vec<String>, JournalError>;
}
