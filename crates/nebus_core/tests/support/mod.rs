#![allow(dead_code)]

use nebus_core::config::UNSAVED_DRAFTS_KEY;
use nebus_core::editor::{UnsavedDraftMap, UnsavedDrafts};
use nebus_core::{
    EditorConfig, EditorSession, KvBackend, KvStore, ManualClock, MemoryBackend, NoteId, NoteSeed,
    NotesStore, RecordingRouter, SessionTarget, SharedNotesStore, StoreConfig, Todo,
};
use std::rc::Rc;

pub const START: i64 = 1_700_000_000_000;

pub struct Fixture {
    pub backend: Rc<dyn KvBackend>,
    pub clock: ManualClock,
    pub store: SharedNotesStore,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_backend(Rc::new(MemoryBackend::new()))
    }

    pub fn with_backend(backend: Rc<dyn KvBackend>) -> Self {
        let clock = ManualClock::new(START);
        let store = NotesStore::open_shared(
            KvStore::new(Rc::clone(&backend)),
            Rc::new(clock.clone()),
            StoreConfig::default(),
        );
        Self {
            backend,
            clock,
            store,
        }
    }

    pub fn open(&self, target: SessionTarget) -> EditorSession<RecordingRouter> {
        EditorSession::open(
            Rc::clone(&self.store),
            RecordingRouter::new(),
            target,
            EditorConfig::default(),
        )
    }

    pub fn open_new(&self) -> EditorSession<RecordingRouter> {
        self.open(SessionTarget::New)
    }

    pub fn open_existing(&self, id: &str) -> EditorSession<RecordingRouter> {
        self.open(SessionTarget::Existing(id.to_string()))
    }

    /// Commits a note with the given title and todos directly to the store.
    pub fn seed_note(&self, title: &str, todos: Vec<Todo>) -> NoteId {
        self.store.borrow_mut().create_note_from(NoteSeed {
            title: title.to_string(),
            todos,
            created_at: None,
        })
    }

    pub fn drafts(&self) -> UnsavedDrafts {
        UnsavedDrafts::new(KvStore::new(Rc::clone(&self.backend)), UNSAVED_DRAFTS_KEY)
    }

    pub fn draft_map(&self) -> UnsavedDraftMap {
        self.drafts().load()
    }
}

pub fn todo(id: &str, text: &str, done: bool) -> Todo {
    Todo {
        id: id.to_string(),
        text: text.to_string(),
        done,
    }
}
