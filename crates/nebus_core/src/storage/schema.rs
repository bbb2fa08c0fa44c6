//! `kv_entries` table bootstrap.
//!
//! # Invariants
//! - The schema revision lives in `PRAGMA user_version`.
//! - A file written by a newer build is refused rather than downgraded.

use super::{StorageError, StorageResult};
use rusqlite::Connection;

/// Schema revision written by this build.
pub const SCHEMA_VERSION: u32 = 1;

const CREATE_KV_ENTRIES: &str = include_str!("kv_entries.sql");

/// Creates the `kv_entries` table on a fresh file and checks the revision of
/// an existing one.
pub(crate) fn ensure_schema(conn: &Connection) -> StorageResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if found > SCHEMA_VERSION {
        return Err(StorageError::UnsupportedSchema {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    if found < SCHEMA_VERSION {
        conn.execute_batch(&format!(
            "BEGIN;\n{CREATE_KV_ENTRIES}\nPRAGMA user_version = {SCHEMA_VERSION};\nCOMMIT;"
        ))?;
    }
    Ok(())
}
