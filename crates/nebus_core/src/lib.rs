//! Editing core for the Nebus notes/todo app.
//! This crate owns undo/redo history, draft autosave and draft/baseline
//! reconciliation; routing and rendering stay with the embedder.

pub mod clock;
pub mod config;
pub mod editor;
pub mod history;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError, EditorConfig, StoreConfig};
pub use editor::{
    EditorSession, HistoryAction, HistoryOutcome, LeaveDecision, LeaveReason, Prompt,
    RecordingRouter, RemovalOutcome, Router, SessionEvent, SessionPhase, SessionTarget,
};
pub use history::History;
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::note::{Note, NoteId, NoteSeed, Timestamp, Todo, TodoId};
pub use storage::{KvBackend, KvStore, MemoryBackend, SqliteBackend, StorageError};
pub use store::{NotesStore, SharedNotesStore};

/// Minimal health-check API for embedders.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
