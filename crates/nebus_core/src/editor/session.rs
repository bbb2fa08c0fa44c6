//! Editor session state machine.
//!
//! # Responsibility
//! - Load a note (or a blank new note) into a draft and a baseline.
//! - Record undo history at two granularities: discrete structural edits and
//!   coalesced text input.
//! - Autosave the draft into the unsaved-draft map after every change.
//! - Commit drafts into the collection store and run cancel/delete flows.
//!
//! # Invariants
//! - `has_unsaved()` is exactly `draft != baseline`.
//! - Pushing a history step clears the redo stack.
//! - An unsaved draft is applied only when its `base_updated_at` matches the
//!   loaded note's `updated_at`; a mismatching one is discarded.
//! - Internal watchers (autosave, dirty tracking) run before observers are
//!   notified, once per public mutating call.
//!
//! # Route-leave contract
//! The embedding router must call [`EditorSession::before_route_leave`] before
//! leaving the editor route. Navigations started by the session itself set a
//! one-shot allow flag that the next check consumes.

use super::notice::SavedNotice;
use super::prompt::{HistoryAction, HistoryOutcome, Prompt, RemovalOutcome};
use super::router::{note_path, LeaveDecision, Router, ROOT_PATH};
use super::unsaved::{UnsavedDraftEntry, UnsavedDrafts};
use crate::clock::Clock;
use crate::config::EditorConfig;
use crate::history::History;
use crate::model::note::{Note, NoteId, NoteSeed, Timestamp, Todo, TodoId};
use crate::store::SharedNotesStore;
use log::{debug, info, warn};
use std::mem;
use std::rc::Rc;

/// Storage id used for the draft of a not-yet-committed note.
pub const NEW_STORAGE_ID: &str = "new";

const TITLE_INPUT_KEY: &str = "title";

/// Which note a session edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTarget {
    New,
    Existing(NoteId),
}

impl SessionTarget {
    /// Maps an editor route parameter (`"new"` or a note id) to a target.
    pub fn from_route_param(param: &str) -> Self {
        if param == NEW_STORAGE_ID {
            Self::New
        } else {
            Self::Existing(param.to_string())
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::New)
    }

    /// Key of this target's entry in the unsaved-draft map.
    pub fn storage_id(&self) -> &str {
        match self {
            Self::New => NEW_STORAGE_ID,
            Self::Existing(id) => id.as_str(),
        }
    }
}

/// Why a session navigated away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    /// Left with no unsaved changes.
    Closed,
    /// Unsaved changes were discarded.
    Cancelled,
    Deleted,
}

/// Coarse lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Existing target not (yet) present in the store.
    Loading,
    Ready,
    Left(LeaveReason),
}

/// Notification delivered to observers after a mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Loaded,
    DraftChanged,
    PromptChanged,
    Saved { note_id: NoteId },
    NoticeHidden,
    Left { reason: LeaveReason, destination: String },
}

/// Read-only view of session state handed to observers.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub target: &'a SessionTarget,
    pub draft: &'a Note,
    pub has_unsaved: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub prompt: Option<&'a Prompt>,
    pub saved_notice: Option<&'a SavedNotice>,
}

pub type ObserverId = u64;

type Observer = Box<dyn FnMut(&SessionEvent, &SessionView<'_>)>;

#[derive(Debug, Default)]
struct InputMerge {
    last_key: Option<String>,
    last_at: Timestamp,
}

pub struct EditorSession<R: Router> {
    store: SharedNotesStore,
    router: R,
    drafts: UnsavedDrafts,
    clock: Rc<dyn Clock>,
    config: EditorConfig,
    target: SessionTarget,
    draft: Note,
    baseline: Option<Note>,
    history: History<Note>,
    input_merge: InputMerge,
    prompt: Option<Prompt>,
    allow_leave_once: bool,
    preserve_history_on_next_load: bool,
    notice: Option<SavedNotice>,
    left: Option<LeaveReason>,
    // Last store copy of the target note seen by `load_draft`.
    observed_note: Option<Note>,
    // Draft as of the last watcher pass.
    watched_draft: Note,
    was_dirty: bool,
    observers: Vec<(ObserverId, Observer)>,
    next_observer_id: ObserverId,
}

impl<R: Router> EditorSession<R> {
    /// Opens a session on `target` and runs the load protocol.
    ///
    /// The clock and key-value storage are shared with the collection store.
    pub fn open(
        store: SharedNotesStore,
        router: R,
        target: SessionTarget,
        config: EditorConfig,
    ) -> Self {
        let (clock, kv) = {
            let store_ref = store.borrow();
            (store_ref.clock(), store_ref.kv().clone())
        };
        let now = clock.now_ms();
        let drafts = UnsavedDrafts::new(kv, config.unsaved_drafts_key.clone());
        let history = History::new(config.history_limit);
        let mut session = Self {
            store,
            router,
            drafts,
            clock,
            config,
            target,
            draft: Note::blank_draft(now),
            baseline: None,
            history,
            input_merge: InputMerge::default(),
            prompt: None,
            allow_leave_once: false,
            preserve_history_on_next_load: false,
            notice: None,
            left: None,
            observed_note: None,
            watched_draft: Note::blank_draft(now),
            was_dirty: false,
            observers: Vec::new(),
            next_observer_id: 1,
        };
        session.load_draft();
        session.watched_draft = session.draft.clone();
        session.was_dirty = session.has_unsaved();
        info!(
            "event=session_open module=editor status=ok target={} ready={} dirty={}",
            session.target.storage_id(),
            session.is_ready(),
            session.was_dirty
        );
        session
    }

    /// Registers a callback fired after every state-mutating call.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&SessionEvent, &SessionView<'_>) + 'static,
    ) -> ObserverId {
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) {
        self.observers.retain(|(observer_id, _)| *observer_id != id);
    }

    pub fn target(&self) -> &SessionTarget {
        &self.target
    }

    pub fn is_new(&self) -> bool {
        self.target.is_new()
    }

    pub fn storage_id(&self) -> &str {
        self.target.storage_id()
    }

    /// `true` for new sessions and for existing notes present in the store.
    pub fn is_ready(&self) -> bool {
        match &self.target {
            SessionTarget::New => true,
            SessionTarget::Existing(id) => self.store.borrow().get_by_id(id).is_some(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if let Some(reason) = self.left {
            return SessionPhase::Left(reason);
        }
        if self.is_ready() {
            SessionPhase::Ready
        } else {
            SessionPhase::Loading
        }
    }

    pub fn draft(&self) -> &Note {
        &self.draft
    }

    pub fn baseline(&self) -> Option<&Note> {
        self.baseline.as_ref()
    }

    pub fn has_unsaved(&self) -> bool {
        match self.baseline.as_ref() {
            Some(baseline) => self.draft != *baseline,
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.past_len()
    }

    pub fn pending_prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    /// The saved confirmation, if it has not expired yet.
    pub fn saved_notice(&self) -> Option<&SavedNotice> {
        let now = self.clock.now_ms();
        self.notice
            .as_ref()
            .filter(|notice| notice.is_visible_at(now))
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut R {
        &mut self.router
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            target: &self.target,
            draft: &self.draft,
            has_unsaved: self.has_unsaved(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            prompt: self.prompt.as_ref(),
            saved_notice: self.saved_notice(),
        }
    }

    /// Points the session at another note (route parameter change).
    pub fn retarget(&mut self, target: SessionTarget) {
        if target == self.target {
            return;
        }
        self.target = target;
        self.left = None;
        self.load_draft();
        self.publish(SessionEvent::Loaded);
    }

    /// Re-runs the load protocol if the target note changed in the store
    /// since it was last observed. Returns whether a reload happened.
    pub fn refresh(&mut self) -> bool {
        if !self.reload_if_note_changed() {
            return false;
        }
        self.publish(SessionEvent::Loaded);
        true
    }

    fn reload_if_note_changed(&mut self) -> bool {
        if self.current_note() == self.observed_note {
            return false;
        }
        self.load_draft();
        true
    }

    fn current_note(&self) -> Option<Note> {
        match &self.target {
            SessionTarget::New => None,
            SessionTarget::Existing(id) => self.store.borrow().get_by_id(id).cloned(),
        }
    }

    fn load_draft(&mut self) {
        let note = self.current_note();
        self.observed_note = note.clone();

        if self.preserve_history_on_next_load && !self.target.is_new() {
            if let (Some(note), Some(baseline)) = (note.as_ref(), self.baseline.as_ref()) {
                if note == baseline {
                    self.preserve_history_on_next_load = false;
                    debug!(
                        "event=draft_load module=editor status=skip reason=preserve_history target={}",
                        self.target.storage_id()
                    );
                    return;
                }
            }
        }

        if self.preserve_history_on_next_load {
            self.preserve_history_on_next_load = false;
        } else {
            self.history.clear();
            self.reset_input_merge();
        }
        self.notice = None;

        let storage_id = self.target.storage_id().to_string();
        let Some(note) = (match &self.target {
            SessionTarget::New => Some(Note::blank_draft(self.clock.now_ms())),
            SessionTarget::Existing(_) => note,
        }) else {
            debug!(
                "event=draft_load module=editor status=skip reason=note_missing target={}",
                storage_id
            );
            return;
        };

        self.draft = note.clone();
        self.baseline = Some(note);

        let Some(unsaved) = self.drafts.get(&storage_id) else {
            return;
        };

        if self.target.is_new() {
            self.draft = unsaved.draft;
            info!("event=draft_restore module=editor status=ok target=new");
            return;
        }

        let fingerprint = self.baseline.as_ref().map(|baseline| baseline.updated_at);
        if fingerprint.is_some() && unsaved.base_updated_at == fingerprint {
            self.draft = unsaved.draft;
            info!(
                "event=draft_restore module=editor status=ok target={}",
                storage_id
            );
        } else {
            self.drafts.clear(&storage_id);
            info!(
                "event=draft_restore module=editor status=discard reason=stale target={}",
                storage_id
            );
        }
    }

    fn reset_input_merge(&mut self) {
        self.input_merge = InputMerge::default();
    }

    /// Pushes the current draft as a discrete history step.
    fn record_history(&mut self) {
        self.history.record_if_changed(&self.draft);
    }

    /// Records a step for text input on `key`, coalescing rapid keystrokes.
    fn record_input_history(&mut self, key: &str) {
        let now = self.clock.now_ms();
        let same_key = self.input_merge.last_key.as_deref() == Some(key);
        let paused = now - self.input_merge.last_at > self.config.input_merge_ms;
        if !same_key || paused || !self.history.can_undo() {
            self.record_history();
        }
        self.input_merge.last_key = Some(key.to_string());
        self.input_merge.last_at = now;
    }

    fn should_confirm_todo_delete(&self, todo: &Todo) -> bool {
        let in_baseline = self
            .baseline
            .as_ref()
            .is_some_and(|baseline| baseline.contains_todo(&todo.id));
        in_baseline || todo.has_content()
    }

    /// Number of todos `target` would drop, if any of them needs confirmation.
    fn confirmable_removal(&self, target: &Note) -> Option<usize> {
        let removed = self.draft.todos_missing_from(target);
        if removed
            .iter()
            .any(|todo| self.should_confirm_todo_delete(todo))
        {
            Some(removed.len())
        } else {
            None
        }
    }

    pub fn undo(&mut self) -> HistoryOutcome {
        self.request_history(HistoryAction::Undo)
    }

    pub fn redo(&mut self) -> HistoryOutcome {
        self.request_history(HistoryAction::Redo)
    }

    fn request_history(&mut self, action: HistoryAction) -> HistoryOutcome {
        let candidate = match action {
            HistoryAction::Undo => self.history.peek_undo(),
            HistoryAction::Redo => self.history.peek_redo(),
        };
        let Some(candidate) = candidate else {
            return HistoryOutcome::Nothing;
        };

        if let Some(removed) = self.confirmable_removal(candidate) {
            self.prompt = Some(Prompt::HistoryDelete { action, removed });
            debug!(
                "event=history_step module=editor status=confirm action={:?} removed={}",
                action, removed
            );
            self.publish(SessionEvent::PromptChanged);
            return HistoryOutcome::NeedsConfirmation { removed };
        }

        self.apply_history(action);
        HistoryOutcome::Applied
    }

    fn apply_history(&mut self, action: HistoryAction) -> bool {
        let applied = match action {
            HistoryAction::Undo => self.history.undo(&mut self.draft),
            HistoryAction::Redo => self.history.redo(&mut self.draft),
        };
        if applied {
            self.reset_input_merge();
            self.publish(SessionEvent::DraftChanged);
        }
        applied
    }

    /// Runs the undo/redo deferred by a [`Prompt::HistoryDelete`].
    pub fn confirm_history_action(&mut self) -> bool {
        let Some(Prompt::HistoryDelete { action, .. }) = self.prompt else {
            return false;
        };
        self.prompt = None;
        if !self.apply_history(action) {
            self.publish(SessionEvent::PromptChanged);
        }
        true
    }

    /// Closes the open prompt without acting on it.
    pub fn dismiss_prompt(&mut self) {
        if self.prompt.take().is_some() {
            self.publish(SessionEvent::PromptChanged);
        }
    }

    pub fn set_title(&mut self, title: &str) -> bool {
        if self.draft.title == title {
            return false;
        }
        self.record_input_history(TITLE_INPUT_KEY);
        self.draft.title = title.to_string();
        self.publish(SessionEvent::DraftChanged);
        true
    }

    /// Appends an empty todo and returns its id.
    pub fn add_todo(&mut self) -> TodoId {
        self.reset_input_merge();
        self.record_history();
        let todo = Todo::empty();
        let id = todo.id.clone();
        self.draft.todos.push(todo);
        self.publish(SessionEvent::DraftChanged);
        id
    }

    pub fn set_todo_text(&mut self, todo_id: &str, text: &str) -> bool {
        match self.draft.todo(todo_id) {
            Some(todo) if todo.text != text => {}
            _ => return false,
        }
        self.record_input_history(&format!("todo-text:{todo_id}"));
        if let Some(todo) = self.draft.todo_mut(todo_id) {
            todo.text = text.to_string();
        }
        self.publish(SessionEvent::DraftChanged);
        true
    }

    pub fn set_todo_done(&mut self, todo_id: &str, done: bool) -> bool {
        match self.draft.todo(todo_id) {
            Some(todo) if todo.done != done => {}
            _ => return false,
        }
        self.reset_input_merge();
        self.record_history();
        if let Some(todo) = self.draft.todo_mut(todo_id) {
            todo.done = done;
        }
        self.publish(SessionEvent::DraftChanged);
        true
    }

    /// Removes a todo, or asks for confirmation when it holds content or
    /// already exists in the baseline.
    pub fn ask_remove_todo(&mut self, todo_id: &str) -> RemovalOutcome {
        let Some(todo) = self.draft.todo(todo_id) else {
            return RemovalOutcome::NotFound;
        };

        if !self.should_confirm_todo_delete(todo) {
            self.remove_todo_by_id(todo_id);
            return RemovalOutcome::Removed;
        }

        self.prompt = Some(Prompt::RemoveTodo {
            todo_id: todo_id.to_string(),
        });
        self.publish(SessionEvent::PromptChanged);
        RemovalOutcome::NeedsConfirmation
    }

    /// Removes the todo held by a [`Prompt::RemoveTodo`].
    pub fn confirm_remove_todo(&mut self) -> bool {
        let Some(Prompt::RemoveTodo { todo_id }) = &self.prompt else {
            return false;
        };
        let todo_id = todo_id.clone();
        self.prompt = None;
        if !self.remove_todo_by_id(&todo_id) {
            self.publish(SessionEvent::PromptChanged);
            return false;
        }
        true
    }

    fn remove_todo_by_id(&mut self, todo_id: &str) -> bool {
        let Some(idx) = self.draft.todos.iter().position(|todo| todo.id == todo_id) else {
            return false;
        };
        self.reset_input_merge();
        self.record_history();
        self.draft.todos.remove(idx);
        self.publish(SessionEvent::DraftChanged);
        true
    }

    /// Commits the draft to the collection store.
    ///
    /// Returns the saved note id, or `None` when the session is not ready.
    pub fn save(&mut self) -> Option<NoteId> {
        if !self.is_ready() {
            debug!(
                "event=note_save module=editor status=skip reason=not_ready target={}",
                self.target.storage_id()
            );
            return None;
        }

        let saved = match self.target.clone() {
            SessionTarget::New => Some(self.save_new()),
            SessionTarget::Existing(id) => self.save_existing(id),
        };
        let Some(note_id) = saved else {
            return None;
        };
        info!(
            "event=note_save module=editor status=ok note_id={} undo_depth={}",
            note_id,
            self.history.past_len()
        );
        self.publish(SessionEvent::Saved {
            note_id: note_id.clone(),
        });
        Some(note_id)
    }

    fn save_new(&mut self) -> NoteId {
        let seed = NoteSeed::from(&self.draft);
        let (new_id, created) = {
            let mut store = self.store.borrow_mut();
            let new_id = store.create_note_from(seed);
            let created = store.get_by_id(&new_id).cloned();
            (new_id, created)
        };

        if let Some(created) = created {
            self.draft = created.clone();
            self.baseline = Some(created);
        }
        // Earlier snapshots still carry the blank draft id.
        self.history.rewrite(|snapshot| snapshot.id = new_id.clone());

        self.show_saved_notice();
        self.preserve_history_on_next_load = true;
        self.drafts.clear(NEW_STORAGE_ID);
        self.router.replace(&note_path(&new_id));
        self.target = SessionTarget::Existing(new_id.clone());
        self.load_draft();
        new_id
    }

    fn save_existing(&mut self, id: NoteId) -> Option<NoteId> {
        let mut saved = self.draft.clone();
        saved.id = id.clone();
        saved.updated_at = self.clock.now_ms();

        let Some(stored) = self.store.borrow_mut().update_note(&saved) else {
            warn!(
                "event=note_save module=editor status=error reason=not_in_store note_id={}",
                id
            );
            return None;
        };
        self.preserve_history_on_next_load = true;
        self.draft = stored.clone();
        self.baseline = Some(stored);
        self.drafts.clear(&id);
        self.show_saved_notice();
        self.reload_if_note_changed();
        Some(id)
    }

    fn show_saved_notice(&mut self) {
        self.notice = Some(SavedNotice::new(
            self.clock.now_ms(),
            self.config.saved_message_ms,
        ));
    }

    /// Drops the saved confirmation once its deadline has passed.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        let expired = self
            .notice
            .as_ref()
            .is_some_and(|notice| !notice.is_visible_at(now));
        if expired {
            self.notice = None;
            self.publish(SessionEvent::NoticeHidden);
        }
    }

    /// Route-leave check; see the module docs for the calling contract.
    pub fn before_route_leave(&mut self, destination: &str) -> LeaveDecision {
        if mem::take(&mut self.allow_leave_once) {
            self.left.get_or_insert(LeaveReason::Closed);
            return LeaveDecision::Allow;
        }

        if !self.has_unsaved() {
            self.left = Some(LeaveReason::Closed);
            return LeaveDecision::Allow;
        }

        self.prompt = Some(Prompt::Cancel {
            destination: destination.to_string(),
        });
        debug!("event=route_leave module=editor status=blocked reason=unsaved");
        self.publish(SessionEvent::PromptChanged);
        LeaveDecision::Block
    }

    /// Raises the cancel prompt with the list as destination.
    pub fn ask_cancel(&mut self) {
        self.prompt = Some(Prompt::Cancel {
            destination: ROOT_PATH.to_string(),
        });
        self.publish(SessionEvent::PromptChanged);
    }

    /// Back action: leave directly when clean, otherwise ask first.
    pub fn back(&mut self) {
        if self.has_unsaved() {
            self.ask_cancel();
            return;
        }
        self.leave(LeaveReason::Closed, ROOT_PATH.to_string());
    }

    /// Discards unsaved changes and navigates to the remembered destination.
    pub fn confirm_cancel(&mut self) {
        let destination = match self.prompt.take() {
            Some(Prompt::Cancel { destination }) => destination,
            other => {
                self.prompt = other;
                ROOT_PATH.to_string()
            }
        };
        let storage_id = self.target.storage_id().to_string();
        self.drafts.clear(&storage_id);
        info!(
            "event=session_cancel module=editor status=ok target={}",
            storage_id
        );
        self.leave(LeaveReason::Cancelled, destination);
    }

    /// Asks before deleting a committed note; a new note is simply abandoned.
    pub fn ask_delete(&mut self) {
        if self.target.is_new() {
            self.leave(LeaveReason::Closed, ROOT_PATH.to_string());
            return;
        }
        self.prompt = Some(Prompt::DeleteNote);
        self.publish(SessionEvent::PromptChanged);
    }

    /// Deletes the note held by a [`Prompt::DeleteNote`]. Returns `false`
    /// when no delete prompt is open.
    pub fn confirm_delete(&mut self) -> bool {
        if self.prompt != Some(Prompt::DeleteNote) {
            return false;
        }
        self.prompt = None;
        let storage_id = self.target.storage_id().to_string();
        self.drafts.clear(&storage_id);
        if let SessionTarget::Existing(id) = &self.target {
            self.store.borrow_mut().delete_note(id);
        }
        self.leave(LeaveReason::Deleted, ROOT_PATH.to_string());
        true
    }

    fn leave(&mut self, reason: LeaveReason, destination: String) {
        self.allow_leave_once = true;
        self.left = Some(reason);
        self.router.navigate(&destination);
        self.publish(SessionEvent::Left {
            reason,
            destination,
        });
    }

    fn publish(&mut self, event: SessionEvent) {
        self.run_watchers();
        if self.observers.is_empty() {
            return;
        }
        let mut observers = mem::take(&mut self.observers);
        {
            let view = self.view();
            for (_, observer) in observers.iter_mut() {
                observer(&event, &view);
            }
        }
        self.observers = observers;
    }

    fn run_watchers(&mut self) {
        let dirty = self.has_unsaved();
        if dirty && !self.was_dirty {
            self.notice = None;
        }
        self.was_dirty = dirty;

        if self.draft != self.watched_draft {
            self.watched_draft = self.draft.clone();
            self.persist_unsaved_draft();
        }
    }

    fn persist_unsaved_draft(&self) {
        let storage_id = self.target.storage_id();
        if !self.has_unsaved() {
            self.drafts.clear(storage_id);
            return;
        }
        let base_updated_at = if self.target.is_new() {
            None
        } else {
            self.baseline.as_ref().map(|baseline| baseline.updated_at)
        };
        self.drafts.put(
            storage_id,
            UnsavedDraftEntry {
                draft: self.draft.clone(),
                base_updated_at,
            },
        );
    }
}
