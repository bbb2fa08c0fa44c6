mod support;

use nebus_core::editor::{note_path, Navigation};
use nebus_core::{
    LeaveDecision, LeaveReason, Prompt, RemovalOutcome, Router, SessionEvent, SessionPhase,
    SessionTarget,
};
use std::cell::RefCell;
use std::rc::Rc;
use support::{todo, Fixture, START};

#[test]
fn saving_new_session_commits_note_and_retargets() {
    let fx = Fixture::new();
    let mut session = fx.open_new();

    session.set_title("Groceries");
    let todo_id = session.add_todo();
    session.set_todo_text(&todo_id, "Milk");
    assert!(fx.draft_map().contains_key("new"));

    let id = session.save().expect("new session is always ready");

    {
        let store = fx.store.borrow();
        assert_eq!(store.len(), 1);
        let note = store.get_by_id(&id).unwrap();
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.todos.len(), 1);
        assert_eq!(note.todos[0].text, "Milk");
        assert!(!note.todos[0].done);
    }
    assert_eq!(session.target(), &SessionTarget::Existing(id.clone()));
    assert!(!session.has_unsaved());
    assert!(fx.draft_map().is_empty());
    assert_eq!(
        session.router().navigations(),
        &[Navigation {
            path: note_path(&id),
            replaced: true
        }]
    );
    assert!(session.can_undo());
    assert!(session.saved_notice().is_some());
}

#[test]
fn saving_existing_session_updates_store_and_resets_dirty_state() {
    let fx = Fixture::new();
    let id = fx.seed_note("Chores", vec![todo("a", "sweep", false)]);
    let mut session = fx.open_existing(&id);

    session.set_todo_done("a", true);
    assert!(session.has_unsaved());
    fx.clock.advance(90_000);

    assert_eq!(session.save(), Some(id.clone()));

    let stored = fx.store.borrow().get_by_id(&id).cloned().unwrap();
    assert!(stored.todo("a").unwrap().done);
    assert_eq!(stored.updated_at, START + 90_000);
    assert_eq!(session.draft(), &stored);
    assert_eq!(session.baseline(), Some(&stored));
    assert!(!session.has_unsaved());
    assert!(fx.draft_map().is_empty());
    assert!(session.can_undo());
    assert!(session.router().navigations().is_empty());
}

#[test]
fn saved_notice_shows_time_and_hides_after_deadline() {
    let fx = Fixture::new();
    let id = fx.seed_note("Chores", vec![]);
    let mut session = fx.open_existing(&id);
    session.set_title("Chores!");
    session.save();

    let notice = session.saved_notice().cloned().unwrap();
    assert!(notice.message.starts_with("Changes saved • "));
    assert_eq!(notice.hide_at, notice.saved_at + 1_700);

    fx.clock.advance(1_000);
    session.set_title("Chores!!");
    session.save();
    let replaced = session.saved_notice().cloned().unwrap();
    assert_eq!(replaced.hide_at, START + 1_000 + 1_700);

    fx.clock.advance(1_699);
    assert!(session.saved_notice().is_some());
    fx.clock.advance(1);
    assert!(session.saved_notice().is_none());
    session.tick();
    assert!(session.view().saved_notice.is_none());
}

#[test]
fn becoming_dirty_hides_saved_notice() {
    let fx = Fixture::new();
    let mut session = fx.open_new();
    session.set_title("Draft");
    session.save();
    assert!(session.saved_notice().is_some());

    session.set_title("Draft 2");
    assert!(session.saved_notice().is_none());
}

#[test]
fn save_is_noop_while_target_is_missing() {
    let fx = Fixture::new();
    let mut session = fx.open_existing("missing");

    assert_eq!(session.phase(), SessionPhase::Loading);
    assert!(!session.is_ready());
    assert_eq!(session.save(), None);
    assert!(fx.store.borrow().is_empty());
}

#[test]
fn route_leave_guard_blocks_dirty_sessions_until_cancel_confirmed() {
    let fx = Fixture::new();
    let id = fx.seed_note("Chores", vec![]);
    let mut session = fx.open_existing(&id);
    session.set_title("edited");

    assert_eq!(session.before_route_leave("/about"), LeaveDecision::Block);
    assert_eq!(
        session.pending_prompt(),
        Some(&Prompt::Cancel {
            destination: "/about".to_string()
        })
    );
    assert!(fx.draft_map().contains_key(id.as_str()));

    session.confirm_cancel();
    assert_eq!(session.router().current_path(), Some("/about"));
    assert!(fx.draft_map().is_empty());
    assert_eq!(session.phase(), SessionPhase::Left(LeaveReason::Cancelled));

    // The router re-checks the navigation the session started.
    assert_eq!(session.before_route_leave("/about"), LeaveDecision::Allow);
    // One-shot: the draft is still dirty, so the next leave is blocked again.
    assert_eq!(session.before_route_leave("/"), LeaveDecision::Block);
    assert_eq!(fx.store.borrow().get_by_id(&id).unwrap().title, "Chores");
}

#[test]
fn clean_session_leaves_without_prompt() {
    let fx = Fixture::new();
    let mut session = fx.open_new();
    assert_eq!(session.before_route_leave("/"), LeaveDecision::Allow);
    assert!(session.pending_prompt().is_none());
}

#[test]
fn dismissing_cancel_prompt_keeps_session() {
    let fx = Fixture::new();
    let mut session = fx.open_new();
    session.set_title("keep me");
    session.before_route_leave("/elsewhere");

    session.dismiss_prompt();
    assert!(session.pending_prompt().is_none());
    assert!(session.router().navigations().is_empty());
    assert_eq!(session.draft().title, "keep me");
    assert!(fx.draft_map().contains_key("new"));
}

#[test]
fn back_navigates_directly_when_clean_and_asks_when_dirty() {
    let fx = Fixture::new();
    let mut clean = fx.open_new();
    clean.back();
    assert_eq!(clean.router().current_path(), Some("/"));
    assert_eq!(clean.phase(), SessionPhase::Left(LeaveReason::Closed));

    let mut dirty = fx.open_new();
    dirty.set_title("unsaved");
    dirty.back();
    assert!(dirty.router().navigations().is_empty());
    assert_eq!(
        dirty.pending_prompt(),
        Some(&Prompt::Cancel {
            destination: "/".to_string()
        })
    );

    dirty.confirm_cancel();
    assert_eq!(dirty.router().current_path(), Some("/"));
    assert!(fx.draft_map().is_empty());
}

#[test]
fn deleting_new_session_just_leaves() {
    let fx = Fixture::new();
    let mut session = fx.open_new();
    session.set_title("throwaway");

    session.ask_delete();
    assert!(session.pending_prompt().is_none());
    assert_eq!(session.router().current_path(), Some("/"));
    assert_eq!(session.before_route_leave("/"), LeaveDecision::Allow);
    assert!(fx.store.borrow().is_empty());
}

#[test]
fn deleting_existing_note_requires_confirmation() {
    let fx = Fixture::new();
    let id = fx.seed_note("Chores", vec![]);
    let mut session = fx.open_existing(&id);
    session.set_title("about to go");

    session.ask_delete();
    assert_eq!(session.pending_prompt(), Some(&Prompt::DeleteNote));
    assert!(fx.store.borrow().get_by_id(&id).is_some());

    assert!(session.confirm_delete());
    assert!(fx.store.borrow().get_by_id(&id).is_none());
    assert!(fx.draft_map().is_empty());
    assert_eq!(session.router().current_path(), Some("/"));
    assert_eq!(session.phase(), SessionPhase::Left(LeaveReason::Deleted));
    assert_eq!(session.before_route_leave("/"), LeaveDecision::Allow);
}

#[test]
fn removing_blank_unsaved_todo_never_prompts() {
    let fx = Fixture::new();
    let mut session = fx.open_new();
    let todo_id = session.add_todo();

    assert_eq!(session.ask_remove_todo(&todo_id), RemovalOutcome::Removed);
    assert!(session.pending_prompt().is_none());
    assert!(session.draft().todos.is_empty());
    assert_eq!(session.ask_remove_todo(&todo_id), RemovalOutcome::NotFound);
}

#[test]
fn removing_todo_with_content_or_history_prompts() {
    let fx = Fixture::new();
    let id = fx.seed_note("Chores", vec![todo("saved", "", false)]);
    let mut session = fx.open_existing(&id);

    let texted = session.add_todo();
    session.set_todo_text(&texted, "   call mom ");
    let checked = session.add_todo();
    session.set_todo_done(&checked, true);

    for todo_id in ["saved", texted.as_str(), checked.as_str()] {
        assert_eq!(
            session.ask_remove_todo(todo_id),
            RemovalOutcome::NeedsConfirmation
        );
        assert_eq!(
            session.pending_prompt(),
            Some(&Prompt::RemoveTodo {
                todo_id: todo_id.to_string()
            })
        );
        session.dismiss_prompt();
    }
    assert_eq!(session.draft().todos.len(), 3);

    session.ask_remove_todo(&texted);
    assert!(session.confirm_remove_todo());
    assert!(session.draft().todo(&texted).is_none());
    assert!(!session.confirm_remove_todo());
}

#[test]
fn whitespace_only_todo_is_removed_without_prompt() {
    let fx = Fixture::new();
    let mut session = fx.open_new();
    let todo_id = session.add_todo();
    session.set_todo_text(&todo_id, "   ");

    assert_eq!(session.ask_remove_todo(&todo_id), RemovalOutcome::Removed);
}

#[test]
fn observers_see_state_after_watchers_run() {
    let fx = Fixture::new();
    let mut session = fx.open_new();
    let seen: Rc<RefCell<Vec<(SessionEvent, bool)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let observer = session.subscribe(move |event, view| {
        sink.borrow_mut().push((event.clone(), view.has_unsaved));
    });

    session.set_title("A");
    let todo_id = session.add_todo();
    session.set_todo_text(&todo_id, "x");
    session.ask_remove_todo(&todo_id);
    session.save();

    let events: Vec<SessionEvent> = seen.borrow().iter().map(|(e, _)| e.clone()).collect();
    assert_eq!(events[0], SessionEvent::DraftChanged);
    assert!(seen.borrow()[0].1);
    assert!(events.contains(&SessionEvent::PromptChanged));
    assert!(matches!(events.last(), Some(SessionEvent::Saved { .. })));
    assert!(!seen.borrow().last().unwrap().1);

    session.unsubscribe(observer);
    let count = seen.borrow().len();
    session.set_title("B");
    assert_eq!(seen.borrow().len(), count);
}

#[test]
fn refresh_reloads_when_store_changes_underneath() {
    let fx = Fixture::new();
    let id = fx.seed_note("Original", vec![]);
    let mut session = fx.open_existing(&id);
    assert!(!session.refresh());

    fx.clock.advance(5_000);
    let mut changed = fx.store.borrow().get_by_id(&id).unwrap().clone();
    changed.title = "Changed in list".to_string();
    fx.store.borrow_mut().update_note(&changed).unwrap();

    session.set_title("local");
    assert!(session.refresh());
    assert_eq!(session.draft().title, "Changed in list");
    assert!(!session.can_undo());

    assert!(fx.store.borrow_mut().undo());
    assert!(session.refresh());
    assert_eq!(session.draft().title, "Original");
}

#[test]
fn retarget_loads_other_note_and_resets_history() {
    let fx = Fixture::new();
    let first = fx.seed_note("First", vec![]);
    let second = fx.seed_note("Second", vec![]);
    let mut session = fx.open_existing(&first);
    session.set_title("First edited");
    assert!(session.can_undo());

    session.retarget(SessionTarget::Existing(second.clone()));
    assert_eq!(session.draft().title, "Second");
    assert!(!session.can_undo());
    assert_eq!(session.storage_id(), second.as_str());
    assert!(fx.draft_map().contains_key(first.as_str()));
}

struct CountingRouter {
    calls: usize,
}

impl Router for CountingRouter {
    fn navigate(&mut self, _path: &str) {
        self.calls += 1;
    }
}

#[test]
fn custom_router_replace_defaults_to_navigate() {
    let fx = Fixture::new();
    let mut session = nebus_core::EditorSession::open(
        Rc::clone(&fx.store),
        CountingRouter { calls: 0 },
        SessionTarget::from_route_param("new"),
        nebus_core::EditorConfig::default(),
    );
    session.set_title("via custom router");
    session.save();
    assert_eq!(session.router().calls, 1);
}

#[test]
fn undo_past_first_save_keeps_note_id_and_next_save_persists() {
    let fx = Fixture::new();
    let mut session = fx.open_new();
    session.set_title("Groceries");
    let id = session.save().unwrap();

    assert_eq!(session.undo(), nebus_core::HistoryOutcome::Applied);
    assert_eq!(session.draft().id, id);
    assert_eq!(session.draft().title, "");

    session.set_title("Groceries v2");
    assert_eq!(session.save(), Some(id.clone()));
    assert!(!session.has_unsaved());

    let store = fx.store.borrow();
    assert_eq!(store.len(), 1);
    assert_eq!(store.get_by_id(&id).unwrap().title, "Groceries v2");
}

#[test]
fn every_snapshot_before_first_save_takes_created_id() {
    let fx = Fixture::new();
    let mut session = fx.open_new();
    session.set_title("One");
    let todo_id = session.add_todo();
    session.set_todo_done(&todo_id, true);
    let id = session.save().unwrap();

    session.undo();
    assert_eq!(session.draft().id, id);
    assert!(!session.draft().todos[0].done);

    assert!(matches!(
        session.undo(),
        nebus_core::HistoryOutcome::NeedsConfirmation { removed: 1 }
    ));
    assert!(session.confirm_history_action());
    assert_eq!(session.draft().id, id);
    assert!(session.draft().todos.is_empty());

    session.redo();
    session.redo();
    assert_eq!(session.draft().id, id);
    assert!(!session.has_unsaved());
}

#[test]
fn confirm_remove_todo_leaves_other_prompts_open() {
    let fx = Fixture::new();
    let mut session = fx.open_new();
    session.set_title("dirty");
    session.before_route_leave("/elsewhere");

    assert!(!session.confirm_remove_todo());
    assert_eq!(
        session.pending_prompt(),
        Some(&Prompt::Cancel {
            destination: "/elsewhere".to_string()
        })
    );

    session.confirm_cancel();
    assert_eq!(session.router().current_path(), Some("/elsewhere"));
}

#[test]
fn confirm_delete_without_prompt_is_noop() {
    let fx = Fixture::new();
    let id = fx.seed_note("Keep", vec![]);
    let mut session = fx.open_existing(&id);

    assert!(!session.confirm_delete());
    assert!(fx.store.borrow().get_by_id(&id).is_some());
    assert!(session.router().navigations().is_empty());
    assert_eq!(session.phase(), SessionPhase::Ready);

    session.ask_cancel();
    assert!(!session.confirm_delete());
    assert!(fx.store.borrow().get_by_id(&id).is_some());
    assert!(matches!(session.pending_prompt(), Some(Prompt::Cancel { .. })));
}

#[test]
fn save_after_note_vanishes_keeps_session_dirty() {
    let fx = Fixture::new();
    let id = fx.seed_note("Doomed", vec![]);
    let mut session = fx.open_existing(&id);
    session.set_title("edited");

    fx.store.borrow_mut().delete_note(&id);
    assert_eq!(session.save(), None);
    assert!(session.has_unsaved());
    assert!(session.saved_notice().is_none());
    assert!(fx.draft_map().contains_key(id.as_str()));
}
