//! Collection store implementation.
//!
//! # Invariants
//! - `commit()` runs before create/update/delete, so the newest past snapshot
//!   is always the state immediately preceding the last mutation.
//! - `past` keeps at most `StoreConfig::history_limit` snapshots.
//! - Lookups by unknown id are silent no-ops.

use crate::clock::Clock;
use crate::config::StoreConfig;
use crate::history::History;
use crate::model::note::{Note, NoteId, NoteSeed};
use crate::storage::KvStore;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Single-threaded shared handle passed to editor sessions.
pub type SharedNotesStore = Rc<RefCell<NotesStore>>;

#[derive(Debug, Default, Deserialize)]
struct StoredNotes {
    #[serde(default)]
    notes: Vec<Note>,
}

#[derive(Serialize)]
struct StoredNotesRef<'a> {
    notes: &'a [Note],
}

pub struct NotesStore {
    notes: Vec<Note>,
    history: History<Vec<Note>>,
    kv: KvStore,
    clock: Rc<dyn Clock>,
    config: StoreConfig,
}

impl NotesStore {
    /// Creates an empty store. Call [`NotesStore::hydrate`] before use.
    pub fn new(kv: KvStore, clock: Rc<dyn Clock>, config: StoreConfig) -> Self {
        let history = History::new(config.history_limit);
        Self {
            notes: Vec::new(),
            history,
            kv,
            clock,
            config,
        }
    }

    /// Creates and hydrates a store, wrapped for sharing with sessions.
    pub fn open_shared(kv: KvStore, clock: Rc<dyn Clock>, config: StoreConfig) -> SharedNotesStore {
        let mut store = Self::new(kv, clock, config);
        store.hydrate();
        Rc::new(RefCell::new(store))
    }

    /// Loads notes from storage and resets history.
    ///
    /// Missing or corrupt data yields an empty collection.
    pub fn hydrate(&mut self) {
        let stored: StoredNotes = self.kv.get(&self.config.notes_key, StoredNotes::default());
        self.notes = stored.notes;
        self.history.clear();
        info!(
            "event=store_hydrate module=store status=ok notes={}",
            self.notes.len()
        );
    }

    fn persist(&self) {
        self.kv.set(
            &self.config.notes_key,
            &StoredNotesRef {
                notes: &self.notes,
            },
        );
    }

    /// Snapshots the current collection, discards redo history and persists.
    pub fn commit(&mut self) {
        self.history.record(&self.notes);
        self.persist();
        debug!(
            "event=store_commit module=store status=ok past={}",
            self.history.past_len()
        );
    }

    /// Restores the previous collection snapshot. Returns `false` when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.notes) {
            return false;
        }
        self.persist();
        info!(
            "event=store_undo module=store status=ok notes={}",
            self.notes.len()
        );
        true
    }

    /// Re-applies the next collection snapshot. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.notes) {
            return false;
        }
        self.persist();
        info!(
            "event=store_redo module=store status=ok notes={}",
            self.notes.len()
        );
        true
    }

    /// Inserts an empty note at the front and returns its id.
    pub fn create_note(&mut self) -> NoteId {
        self.create_note_from(NoteSeed::default())
    }

    /// Inserts a note built from `seed` at the front and returns its id.
    ///
    /// `updated_at` is stamped with the current time; `created_at` comes from
    /// the seed when provided.
    pub fn create_note_from(&mut self, seed: NoteSeed) -> NoteId {
        let now = self.clock.now_ms();
        let mut note = Note::new(now);
        note.title = seed.title;
        note.todos = seed.todos;
        note.created_at = seed.created_at.unwrap_or(now);
        let id = note.id.clone();

        self.commit();
        self.notes.insert(0, note);
        self.persist();
        info!(
            "event=note_create module=store status=ok note_id={} todos={}",
            id,
            self.notes[0].todos.len()
        );
        id
    }

    /// Replaces the stored note with the same id, stamping a fresh
    /// `updated_at`. Returns the stored copy, or `None` when not found.
    pub fn update_note(&mut self, note: &Note) -> Option<Note> {
        let idx = self.position(&note.id)?;
        self.commit();
        let mut stored = note.clone();
        stored.updated_at = self.clock.now_ms();
        self.notes[idx] = stored.clone();
        self.persist();
        info!(
            "event=note_update module=store status=ok note_id={} updated_at={}",
            stored.id, stored.updated_at
        );
        Some(stored)
    }

    /// Removes the note with `id`. Returns whether a note was removed.
    pub fn delete_note(&mut self, id: &str) -> bool {
        let Some(idx) = self.position(id) else {
            debug!("event=note_delete module=store status=skip reason=not_found");
            return false;
        };
        self.commit();
        self.notes.remove(idx);
        self.persist();
        info!("event=note_delete module=store status=ok note_id={}", id);
        true
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Notes in display order (newest first).
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        Rc::clone(&self.clock)
    }

    pub fn kv(&self) -> &KvStore {
        &self.kv
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }
}
