//! Bounded linear undo/redo history over full value snapshots.
//!
//! # Responsibility
//! - Store independent copies (`Clone`) of past and future states.
//! - Compare snapshots structurally (`PartialEq`) to skip no-op steps.
//!
//! # Invariants
//! - Recording a new step clears `future` (the redo branch is discarded).
//! - `past` never holds more than `limit` entries; the oldest is dropped.
//! - Undo/redo move exactly one snapshot between the stacks.

use std::mem;

#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    past: Vec<T>,
    future: Vec<T>,
    limit: usize,
}

impl<T: Clone + PartialEq> History<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Pushes a copy of `current` onto `past` and discards the redo branch.
    pub fn record(&mut self, current: &T) {
        self.past.push(current.clone());
        if self.past.len() > self.limit {
            let overflow = self.past.len() - self.limit;
            self.past.drain(..overflow);
        }
        self.future.clear();
    }

    /// Like [`History::record`], but skips the step when `current` equals the
    /// newest past snapshot. Returns whether a step was recorded.
    pub fn record_if_changed(&mut self, current: &T) -> bool {
        if self.past.last() == Some(current) {
            return false;
        }
        self.record(current);
        true
    }

    /// State that `undo` would restore.
    pub fn peek_undo(&self) -> Option<&T> {
        self.past.last()
    }

    /// State that `redo` would restore.
    pub fn peek_redo(&self) -> Option<&T> {
        self.future.last()
    }

    /// Replaces `current` with the newest past snapshot. Returns `false`
    /// (leaving `current` untouched) when there is nothing to undo.
    pub fn undo(&mut self, current: &mut T) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        self.future.push(mem::replace(current, previous));
        true
    }

    /// Replaces `current` with the newest future snapshot. Returns `false`
    /// when there is nothing to redo.
    pub fn redo(&mut self, current: &mut T) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        self.past.push(mem::replace(current, next));
        true
    }

    /// Applies `edit` to every stored snapshot on both stacks.
    pub fn rewrite(&mut self, mut edit: impl FnMut(&mut T)) {
        self.past.iter_mut().chain(self.future.iter_mut()).for_each(|snapshot| edit(snapshot));
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::History;

    #[test]
    fn record_drops_oldest_beyond_limit() {
        let mut history = History::new(3);
        for value in 0..5 {
            history.record(&value);
        }
        assert_eq!(history.past_len(), 3);

        let mut current = 99;
        assert!(history.undo(&mut current));
        assert_eq!(current, 4);
        assert!(history.undo(&mut current));
        assert!(history.undo(&mut current));
        assert_eq!(current, 2);
        assert!(!history.undo(&mut current));
        assert_eq!(current, 2);
    }

    #[test]
    fn new_step_discards_redo_branch() {
        let mut history = History::new(10);
        let mut current = 1;
        history.record(&current);
        current = 2;
        assert!(history.undo(&mut current));
        assert!(history.can_redo());

        history.record(&current);
        assert!(!history.can_redo());
    }

    #[test]
    fn record_if_changed_skips_duplicate_top() {
        let mut history = History::new(10);
        assert!(history.record_if_changed(&"a"));
        assert!(!history.record_if_changed(&"a"));
        assert!(history.record_if_changed(&"b"));
        assert_eq!(history.past_len(), 2);
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut history = History::new(10);
        let mut current = vec![1];
        history.record(&current);
        current.push(2);

        let before = current.clone();
        assert!(history.undo(&mut current));
        assert_eq!(current, vec![1]);
        assert!(history.redo(&mut current));
        assert_eq!(current, before);
        assert_eq!(history.peek_undo(), Some(&vec![1]));
    }

    #[test]
    fn rewrite_touches_both_stacks() {
        let mut history = History::new(10);
        history.record(&1);
        history.record(&2);
        let mut current = 3;
        history.undo(&mut current);

        history.rewrite(|value| *value *= 10);
        assert!(history.undo(&mut current));
        assert_eq!(current, 10);
        assert!(history.redo(&mut current));
        assert!(history.redo(&mut current));
        assert_eq!(current, 30);
    }
}
