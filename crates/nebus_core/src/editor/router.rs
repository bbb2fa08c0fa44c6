//! Router collaborator contract.
//!
//! The session never performs routing itself; it asks a `Router` to move and
//! answers route-leave checks through `EditorSession::before_route_leave`.

/// Path of the notes list.
pub const ROOT_PATH: &str = "/";

/// Path of the editor for `note_id`.
pub fn note_path(note_id: &str) -> String {
    format!("/notes/{note_id}")
}

/// Outcome of a route-leave check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveDecision {
    Allow,
    Block,
}

/// Navigation surface used by editor sessions.
pub trait Router {
    /// Pushes a new location.
    fn navigate(&mut self, path: &str);

    /// Replaces the current location without adding a history entry.
    fn replace(&mut self, path: &str) {
        self.navigate(path);
    }
}

/// One navigation performed through a [`RecordingRouter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub replaced: bool,
}

/// Headless router that records every navigation request.
#[derive(Debug, Clone, Default)]
pub struct RecordingRouter {
    log: Vec<Navigation>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigations(&self) -> &[Navigation] {
        &self.log
    }

    pub fn current_path(&self) -> Option<&str> {
        self.log.last().map(|nav| nav.path.as_str())
    }
}

impl Router for RecordingRouter {
    fn navigate(&mut self, path: &str) {
        self.log.push(Navigation {
            path: path.to_string(),
            replaced: false,
        });
    }

    fn replace(&mut self, path: &str) {
        self.log.push(Navigation {
            path: path.to_string(),
            replaced: true,
        });
    }
}
