//! Transient "saved" confirmation.

use crate::clock::format_hour_minute;
use crate::model::note::Timestamp;

/// Message shown after a successful save; hidden once `hide_at` passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedNotice {
    pub message: String,
    pub saved_at: Timestamp,
    pub hide_at: Timestamp,
}

impl SavedNotice {
    pub fn new(saved_at: Timestamp, visible_for_ms: i64) -> Self {
        Self {
            message: format!("Changes saved • {}", format_hour_minute(saved_at)),
            saved_at,
            hide_at: saved_at + visible_for_ms,
        }
    }

    pub fn is_visible_at(&self, now: Timestamp) -> bool {
        now < self.hide_at
    }
}
