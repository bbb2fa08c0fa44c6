//! Note and todo value types.
//!
//! # Responsibility
//! - Define the canonical note record and its ordered todo list.
//! - Provide id generation and small lookup helpers used by editor flows.
//!
//! # Invariants
//! - `id` is generated once and never reused for another note or todo.
//! - `updated_at` changes only on committed save, never on draft edits.
//! - A note draft for an uncommitted session carries an empty `id`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for notes. Kept as a string so uncommitted drafts can
/// carry the empty id.
pub type NoteId = String;

/// Stable identifier for todo items.
pub type TodoId = String;

/// Unix epoch milliseconds.
pub type Timestamp = i64;

/// Generates a fresh unique id for a note or todo.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// One checklist item inside a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub done: bool,
}

impl Todo {
    /// Creates an empty, not-done todo with a generated id.
    pub fn empty() -> Self {
        Self {
            id: new_id(),
            text: String::new(),
            done: false,
        }
    }

    /// Returns whether the todo carries user content worth protecting.
    pub fn has_content(&self) -> bool {
        self.done || !self.text.trim().is_empty()
    }
}

/// Canonical note record.
///
/// Serialized with camelCase field names to keep stored collections and
/// unsaved drafts readable across versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Display order is insertion order.
    #[serde(default)]
    pub todos: Vec<Todo>,
    pub created_at: Timestamp,
    /// Fingerprint used to detect stale unsaved drafts.
    pub updated_at: Timestamp,
}

impl Note {
    /// Creates an empty note with a generated id, stamped at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self::with_id(new_id(), now)
    }

    /// Creates an empty note with a caller-provided id, stamped at `now`.
    pub fn with_id(id: impl Into<NoteId>, now: Timestamp) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            todos: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates the placeholder draft used by a session editing a new note.
    pub fn blank_draft(now: Timestamp) -> Self {
        Self::with_id(String::new(), now)
    }

    pub fn todo(&self, todo_id: &str) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == todo_id)
    }

    pub fn todo_mut(&mut self, todo_id: &str) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|todo| todo.id == todo_id)
    }

    pub fn contains_todo(&self, todo_id: &str) -> bool {
        self.todo(todo_id).is_some()
    }

    /// Returns the todos present in `self` but absent (by id) from `target`.
    pub fn todos_missing_from<'a>(&'a self, target: &Note) -> Vec<&'a Todo> {
        self.todos
            .iter()
            .filter(|todo| !target.contains_todo(&todo.id))
            .collect()
    }
}

/// Fields a caller may provide when committing a brand-new note.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteSeed {
    pub title: String,
    pub todos: Vec<Todo>,
    /// Falls back to the commit time when absent.
    pub created_at: Option<Timestamp>,
}

impl From<&Note> for NoteSeed {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            todos: note.todos.clone(),
            created_at: Some(note.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, Todo};

    #[test]
    fn blank_draft_has_empty_id_and_matching_timestamps() {
        let draft = Note::blank_draft(42);
        assert!(draft.id.is_empty());
        assert_eq!(draft.created_at, 42);
        assert_eq!(draft.updated_at, 42);
        assert!(draft.todos.is_empty());
    }

    #[test]
    fn todos_missing_from_compares_by_id_only() {
        let mut current = Note::new(1);
        let kept = Todo::empty();
        let dropped = Todo::empty();
        current.todos = vec![kept.clone(), dropped.clone()];

        let mut target = current.clone();
        target.todos = vec![Todo {
            text: "changed text".to_string(),
            ..kept
        }];

        let missing = current.todos_missing_from(&target);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].id, dropped.id);
    }

    #[test]
    fn has_content_ignores_whitespace_only_text() {
        let mut todo = Todo::empty();
        todo.text = "   \n".to_string();
        assert!(!todo.has_content());
        todo.done = true;
        assert!(todo.has_content());
    }
}
