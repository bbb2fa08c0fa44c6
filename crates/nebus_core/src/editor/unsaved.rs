//! Persistent map of in-progress drafts keyed by session storage id.
//!
//! # Invariants
//! - `base_updated_at` is `None` for drafts of uncommitted notes and the
//!   baseline fingerprint otherwise.
//! - Clearing an absent entry does not rewrite storage.

use crate::model::note::{Note, Timestamp};
use crate::storage::KvStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsavedDraftEntry {
    pub draft: Note,
    pub base_updated_at: Option<Timestamp>,
}

pub type UnsavedDraftMap = BTreeMap<String, UnsavedDraftEntry>;

/// Accessor for the unsaved-draft map stored under one key.
#[derive(Clone)]
pub struct UnsavedDrafts {
    kv: KvStore,
    key: String,
}

impl UnsavedDrafts {
    pub fn new(kv: KvStore, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    /// Loads the whole map; corrupt or missing data yields an empty map.
    pub fn load(&self) -> UnsavedDraftMap {
        self.kv.get(&self.key, UnsavedDraftMap::new())
    }

    pub fn get(&self, storage_id: &str) -> Option<UnsavedDraftEntry> {
        self.load().remove(storage_id)
    }

    pub fn put(&self, storage_id: &str, entry: UnsavedDraftEntry) {
        let mut map = self.load();
        map.insert(storage_id.to_string(), entry);
        self.kv.set(&self.key, &map);
    }

    /// Removes the entry for `storage_id`. Returns whether one existed.
    pub fn clear(&self, storage_id: &str) -> bool {
        let mut map = self.load();
        if map.remove(storage_id).is_none() {
            return false;
        }
        self.kv.set(&self.key, &map);
        true
    }
}
