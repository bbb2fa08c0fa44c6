//! Confirmation prompts and operation outcomes.

use crate::model::note::TodoId;

/// Direction of a deferred history transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

/// Confirmation currently requested from the user. At most one is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Leaving with unsaved changes; `destination` is where to go on confirm.
    Cancel { destination: String },
    /// Deleting the committed note.
    DeleteNote,
    /// Removing a todo that carries content or was already saved.
    RemoveTodo { todo_id: TodoId },
    /// An undo/redo step that would drop `removed` todos.
    HistoryDelete { action: HistoryAction, removed: usize },
}

/// Result of an undo/redo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    Applied,
    /// Deferred behind a [`Prompt::HistoryDelete`].
    NeedsConfirmation { removed: usize },
    /// Stack empty.
    Nothing,
}

/// Result of a todo removal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed,
    /// Deferred behind a [`Prompt::RemoveTodo`].
    NeedsConfirmation,
    NotFound,
}
