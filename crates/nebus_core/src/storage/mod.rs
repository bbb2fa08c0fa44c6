//! Local key-value storage used for the notes collection and unsaved drafts.
//!
//! # Responsibility
//! - Define the byte-level backend contract (`KvBackend`).
//! - Provide in-memory and SQLite-file implementations.
//! - Wrap backends with JSON (de)serialization and safe fallbacks (`KvStore`).
//!
//! # Invariants
//! - Reads never fail at the `KvStore` level: missing, unreadable or corrupt
//!   entries degrade to the caller's fallback value.
//! - Backends have no ownership semantics over keys; any holder may
//!   overwrite any key.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod kv;
mod memory;
pub mod schema;
mod sqlite;

pub use kv::KvStore;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage boundary error.
#[derive(Debug)]
pub enum StorageError {
    /// SQLite backend failure.
    Sqlite(rusqlite::Error),
    /// Storage file was written by a newer schema revision.
    UnsupportedSchema { found: u32, supported: u32 },
    /// Value could not be encoded as JSON.
    Encode(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "storage backend failure: {err}"),
            Self::UnsupportedSchema { found, supported } => write!(
                f,
                "storage schema revision {found} is newer than supported {supported}"
            ),
            Self::Encode(err) => write!(f, "failed to encode stored value: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchema { .. } => None,
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Synchronous byte store keyed by string.
///
/// Methods take `&self`; implementations use interior mutability so one
/// backend can be shared by the collection store and every editor session.
pub trait KvBackend {
    /// Returns the stored bytes, or `None` when the key is absent.
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;
    /// Inserts or replaces the bytes stored under `key`.
    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()>;
    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
