//! Canonical notes collection.
//!
//! # Responsibility
//! - Own the authoritative ordered list of notes.
//! - Keep list-level undo/redo history and persist after every change.
//!
//! # Invariants
//! - Every mutating operation commits the pre-mutation state first.
//! - Persistence happens synchronously inside the mutating call.

mod notes_store;

pub use notes_store::{NotesStore, SharedNotesStore};
