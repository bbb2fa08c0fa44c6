//! Time source abstraction.
//!
//! # Responsibility
//! - Provide epoch-millisecond timestamps for note stamping, input merge
//!   windows and saved-message deadlines.
//! - Allow deterministic time in tests and headless embeddings.
//!
//! # Invariants
//! - `now_ms` never panics; a clock before the Unix epoch reports `0`.

use crate::model::note::Timestamp;
use chrono::{Local, TimeZone};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" in Unix epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> Timestamp;
}

/// Wall clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as Timestamp)
            .unwrap_or(0)
    }
}

/// Manually driven clock. Clones share the same underlying time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Timestamp>>,
}

impl ManualClock {
    pub fn new(start_ms: Timestamp) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: Timestamp) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: Timestamp) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Timestamp {
        self.now.get()
    }
}

/// Formats the local wall time of `timestamp` as `HH:MM`.
///
/// Out-of-range timestamps render as `--:--`.
pub fn format_hour_minute(timestamp: Timestamp) -> String {
    Local
        .timestamp_millis_opt(timestamp)
        .earliest()
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
