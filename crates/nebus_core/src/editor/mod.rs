//! Per-note editing sessions.
//!
//! # Responsibility
//! - Hold the draft, baseline and fine-grained undo history of one note.
//! - Autosave in-progress drafts so they survive reloads.
//! - Drive save/cancel/delete flows and their confirmation prompts.
//!
//! # Invariants
//! - A session exclusively owns its draft, baseline and history.
//! - The collection store is reached only through the handle given at
//!   construction.
//! - Destructive transitions (todo removal, history steps that drop todos)
//!   go through a confirmation prompt when they would lose user content.

mod notice;
mod prompt;
mod router;
mod session;
mod unsaved;

pub use notice::SavedNotice;
pub use prompt::{HistoryAction, HistoryOutcome, Prompt, RemovalOutcome};
pub use router::{note_path, LeaveDecision, Navigation, RecordingRouter, Router, ROOT_PATH};
pub use session::{
    EditorSession, LeaveReason, ObserverId, SessionEvent, SessionPhase, SessionTarget,
    SessionView, NEW_STORAGE_ID,
};
pub use unsaved::{UnsavedDraftEntry, UnsavedDraftMap, UnsavedDrafts};
