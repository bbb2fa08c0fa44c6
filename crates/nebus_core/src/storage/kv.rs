//! JSON adapter over a shared `KvBackend`.
//!
//! # Responsibility
//! - Serialize values to JSON on write and parse them on read.
//! - Degrade every read failure to the caller-provided fallback.
//!
//! # Invariants
//! - `get` never fails and never panics.
//! - A detached store (no backend) reads fallbacks and ignores writes.

use super::{KvBackend, StorageResult};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::rc::Rc;

/// Cloneable handle to keyed JSON storage.
#[derive(Clone)]
pub struct KvStore {
    backend: Option<Rc<dyn KvBackend>>,
}

impl KvStore {
    pub fn new(backend: Rc<dyn KvBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Store without a backend, for non-interactive contexts.
    pub fn detached() -> Self {
        Self { backend: None }
    }

    pub fn is_detached(&self) -> bool {
        self.backend.is_none()
    }

    /// Reads and parses the value under `key`, or returns `fallback` when the
    /// key is missing, empty, unreadable or not valid JSON for `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let Some(backend) = self.backend.as_ref() else {
            return fallback;
        };

        let bytes = match backend.read(key) {
            Ok(Some(bytes)) if !bytes.is_empty() => bytes,
            Ok(_) => return fallback,
            Err(err) => {
                warn!(
                    "event=kv_read module=storage status=error key={} error={}",
                    key, err
                );
                return fallback;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=kv_read module=storage status=fallback key={} error_code=corrupt_json line={} column={}",
                    key,
                    err.line(),
                    err.column()
                );
                fallback
            }
        }
    }

    /// Serializes and stores `value`, returning storage errors to the caller.
    pub fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let Some(backend) = self.backend.as_ref() else {
            return Ok(());
        };
        let bytes = serde_json::to_vec(value)?;
        backend.write(key, &bytes)
    }

    /// Serializes and stores `value`; failures are logged and swallowed.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(err) = self.try_set(key, value) {
            warn!(
                "event=kv_write module=storage status=error key={} error={}",
                key, err
            );
        }
    }

    /// Removes `key`; failures are logged and swallowed.
    pub fn remove(&self, key: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        if let Err(err) = backend.remove(key) {
            warn!(
                "event=kv_remove module=storage status=error key={} error={}",
                key, err
            );
        }
    }
}
