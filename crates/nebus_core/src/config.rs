//! Tunables for the collection store and editor sessions.
//!
//! # Responsibility
//! - Hold history bounds, timing windows and storage keys in one place.
//! - Allow partial overrides from JSON (`#[serde(default)]`).
//!
//! # Invariants
//! - History limits are at least 1.
//! - Storage keys are non-empty and distinct.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const NOTES_STORAGE_KEY: &str = "nebus_notes_v1";
pub const UNSAVED_DRAFTS_KEY: &str = "nebus_note_unsaved_drafts_v1";
pub const COLLECTION_HISTORY_LIMIT: usize = 100;
pub const SESSION_HISTORY_LIMIT: usize = 150;
pub const INPUT_MERGE_MS: i64 = 500;
pub const SAVED_MESSAGE_MS: i64 = 1700;

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroHistoryLimit(&'static str),
    EmptyStorageKey(&'static str),
    NegativeDuration(&'static str),
    DuplicateStorageKey(String),
    Parse(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroHistoryLimit(field) => write!(f, "`{field}` must be at least 1"),
            Self::EmptyStorageKey(field) => write!(f, "`{field}` cannot be empty"),
            Self::NegativeDuration(field) => write!(f, "`{field}` cannot be negative"),
            Self::DuplicateStorageKey(key) => {
                write!(f, "storage key `{key}` is used for both notes and drafts")
            }
            Self::Parse(message) => write!(f, "invalid config document: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Collection store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    pub notes_key: String,
    pub history_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            notes_key: NOTES_STORAGE_KEY.to_string(),
            history_limit: COLLECTION_HISTORY_LIMIT,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notes_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey("notesKey"));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::ZeroHistoryLimit("historyLimit"));
        }
        Ok(())
    }
}

/// Editor session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub history_limit: usize,
    /// Keystrokes on the same field closer than this merge into one step.
    pub input_merge_ms: i64,
    pub saved_message_ms: i64,
    pub unsaved_drafts_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: SESSION_HISTORY_LIMIT,
            input_merge_ms: INPUT_MERGE_MS,
            saved_message_ms: SAVED_MESSAGE_MS,
            unsaved_drafts_key: UNSAVED_DRAFTS_KEY.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::ZeroHistoryLimit("historyLimit"));
        }
        if self.input_merge_ms < 0 {
            return Err(ConfigError::NegativeDuration("inputMergeMs"));
        }
        if self.saved_message_ms < 0 {
            return Err(ConfigError::NegativeDuration("savedMessageMs"));
        }
        if self.unsaved_drafts_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey("unsavedDraftsKey"));
        }
        Ok(())
    }
}

/// Combined settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub editor: EditorConfig,
}

impl AppConfig {
    /// Parses a JSON document; absent fields keep their defaults.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.editor.validate()?;
        if self.store.notes_key == self.editor.unsaved_drafts_key {
            return Err(ConfigError::DuplicateStorageKey(self.store.notes_key.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, EditorConfig, StoreConfig};

    #[test]
    fn defaults_validate() {
        AppConfig::default().validate().unwrap();
        assert_eq!(StoreConfig::default().history_limit, 100);
        assert_eq!(EditorConfig::default().history_limit, 150);
    }

    #[test]
    fn partial_json_overrides_single_field() {
        let config = AppConfig::from_json(r#"{"editor":{"inputMergeMs":250}}"#).unwrap();
        assert_eq!(config.editor.input_merge_ms, 250);
        assert_eq!(config.editor.saved_message_ms, 1700);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn rejects_zero_limit_and_shared_keys() {
        let err = AppConfig::from_json(r#"{"store":{"historyLimit":0}}"#).unwrap_err();
        assert_eq!(err, ConfigError::ZeroHistoryLimit("historyLimit"));

        let err = AppConfig::from_json(
            r#"{"store":{"notesKey":"same"},"editor":{"unsavedDraftsKey":"same"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateStorageKey(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = AppConfig::from_json("{").unwrap_err();
        assert!(err.to_string().contains("invalid config document"));
    }
}
