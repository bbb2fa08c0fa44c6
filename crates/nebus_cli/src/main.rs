//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `nebus_core` linkage without any UI runtime.
//! - Run one scripted editing session against in-memory storage and print a
//!   deterministic summary.

use nebus_core::{
    EditorConfig, EditorSession, KvStore, MemoryBackend, NotesStore, RecordingRouter,
    SessionTarget, StoreConfig, SystemClock,
};
use std::rc::Rc;

fn main() {
    println!("nebus_core ping={}", nebus_core::ping());
    println!("nebus_core version={}", nebus_core::core_version());

    let kv = KvStore::new(Rc::new(MemoryBackend::new()));
    let store = NotesStore::open_shared(kv, Rc::new(SystemClock), StoreConfig::default());
    let mut session = EditorSession::open(
        Rc::clone(&store),
        RecordingRouter::new(),
        SessionTarget::New,
        EditorConfig::default(),
    );

    session.set_title("Smoke");
    let todo_id = session.add_todo();
    session.set_todo_text(&todo_id, "check wiring");
    let saved = session.save();

    println!(
        "session saved={} notes={} dirty={}",
        saved.is_some(),
        store.borrow().len(),
        session.has_unsaved()
    );
}
