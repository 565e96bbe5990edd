//! Persisted card preferences.
//!
//! The whole preference object lives as one JSON blob under
//! [`PREFERENCES_KEY`]. Every save shallow-merges a [`PreferencesPatch`] into
//! the in-memory copy and rewrites the full blob.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
mod sqlite;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use sqlite::SqliteStorage;
#[cfg(target_arch = "wasm32")]
pub use web::BrowserStorage;

pub const PREFERENCES_KEY: &str = "homeassistant.mediabrowsercard";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failed: {0}")]
    Backend(String),
    #[error("could not serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Key/value capability the preference store writes through.
pub trait StorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UiPreferences {
    #[serde(default)]
    pub played_item_ids: Vec<String>,
    #[serde(default)]
    pub current_path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_player_id: Option<String>,
    /// Keys written by other versions of the card, carried through rewrites.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UiPreferences {
    pub fn has_played(&self, content_id: &str) -> bool {
        self.played_item_ids.iter().any(|id| id == content_id)
    }
}

/// Partial update; `None` fields leave the stored value untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreferencesPatch {
    pub played_item_ids: Option<Vec<String>>,
    pub current_path: Option<Vec<String>>,
    pub selected_player_id: Option<Option<String>>,
}

impl PreferencesPatch {
    pub fn played_item_ids(ids: Vec<String>) -> Self {
        Self {
            played_item_ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn current_path(path: Vec<String>) -> Self {
        Self {
            current_path: Some(path),
            ..Self::default()
        }
    }

    pub fn selected_player_id(id: Option<String>) -> Self {
        Self {
            selected_player_id: Some(id),
            ..Self::default()
        }
    }

    fn apply_to(self, prefs: &mut UiPreferences) {
        if let Some(ids) = self.played_item_ids {
            prefs.played_item_ids = ids;
        }
        if let Some(path) = self.current_path {
            prefs.current_path = path;
        }
        if let Some(selected) = self.selected_player_id {
            prefs.selected_player_id = selected;
        }
    }
}

pub struct PreferenceStore {
    backend: Box<dyn StorageBackend>,
    current: UiPreferences,
}

impl PreferenceStore {
    /// Loads the stored blob over defaults. A missing key yields defaults; so
    /// does a corrupt blob, which the next save overwrites.
    pub fn load(backend: impl StorageBackend + 'static) -> Self {
        let current = match backend.read(PREFERENCES_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|err| {
                tracing::warn!("stored card preferences are corrupt, resetting: {err}");
                UiPreferences::default()
            }),
            Ok(None) => UiPreferences::default(),
            Err(err) => {
                tracing::warn!("could not read card preferences: {err}");
                UiPreferences::default()
            }
        };

        Self {
            backend: Box::new(backend),
            current,
        }
    }

    pub fn get(&self) -> &UiPreferences {
        &self.current
    }

    /// Merges `patch` and rewrites the blob. The in-memory copy is updated even
    /// when the write fails.
    pub fn save(&mut self, patch: PreferencesPatch) -> Result<(), StorageError> {
        patch.apply_to(&mut self.current);
        let json = serde_json::to_string(&self.current)?;
        self.backend.write(PREFERENCES_KEY, &json)
    }

    /// [`save`](Self::save), logging instead of returning the error.
    pub fn save_or_log(&mut self, patch: PreferencesPatch) {
        if let Err(err) = self.save(patch) {
            tracing::warn!("could not persist card preferences: {err}");
        }
    }
}

/// Preferences backed by the platform's default storage.
#[cfg(target_arch = "wasm32")]
pub fn open_preferences() -> PreferenceStore {
    PreferenceStore::load(BrowserStorage)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn open_preferences() -> PreferenceStore {
    match SqliteStorage::open_default() {
        Ok(storage) => PreferenceStore::load(storage),
        Err(err) => {
            tracing::warn!("falling back to in-memory preferences: {err}");
            PreferenceStore::load(MemoryStorage::new())
        }
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Memory backend whose contents stay visible to the test after the store
    /// takes ownership.
    #[derive(Clone, Default)]
    struct SharedStorage(Rc<RefCell<MemoryStorage>>);

    impl StorageBackend for SharedStorage {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.borrow().read(key)
        }

        fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.borrow_mut().write(key, value)
        }
    }

    struct FailingStorage;

    impl StorageBackend for FailingStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::backend("quota exceeded"))
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::backend("quota exceeded"))
        }
    }

    #[test]
    fn empty_storage_loads_defaults() {
        let store = PreferenceStore::load(MemoryStorage::new());
        assert_eq!(store.get(), &UiPreferences::default());
    }

    #[test]
    fn partial_object_is_merged_over_defaults() {
        let storage = MemoryStorage::with_entry(PREFERENCES_KEY, r#"{"selectedPlayerId":"media_player.den"}"#);
        let store = PreferenceStore::load(storage);
        assert!(store.get().played_item_ids.is_empty());
        assert!(store.get().current_path.is_empty());
        assert_eq!(store.get().selected_player_id.as_deref(), Some("media_player.den"));
    }

    #[test]
    fn corrupt_json_resets_to_defaults() {
        let storage = MemoryStorage::with_entry(PREFERENCES_KEY, "{not json");
        let store = PreferenceStore::load(storage);
        assert_eq!(store.get(), &UiPreferences::default());
    }

    #[test]
    fn save_merges_and_keeps_untouched_fields() {
        let shared = SharedStorage::default();
        let mut store = PreferenceStore::load(shared.clone());
        store
            .save(PreferencesPatch::current_path(vec!["dir-1".into(), "dir-2".into()]))
            .unwrap();
        store
            .save(PreferencesPatch::played_item_ids(vec!["a".into()]))
            .unwrap();

        let reloaded = PreferenceStore::load(shared);
        assert_eq!(reloaded.get().played_item_ids, vec!["a".to_string()]);
        assert_eq!(
            reloaded.get().current_path,
            vec!["dir-1".to_string(), "dir-2".to_string()]
        );
    }

    #[test]
    fn clearing_selection_drops_the_key() {
        let shared = SharedStorage::default();
        let mut store = PreferenceStore::load(shared.clone());
        store
            .save(PreferencesPatch::selected_player_id(Some("browser".into())))
            .unwrap();
        store.save(PreferencesPatch::selected_player_id(None)).unwrap();

        let raw = shared.0.borrow().get(PREFERENCES_KEY).unwrap().to_string();
        assert!(!raw.contains("selectedPlayerId"));
    }

    #[test]
    fn unknown_keys_survive_a_rewrite() {
        let shared = SharedStorage::default();
        shared
            .0
            .borrow_mut()
            .write(PREFERENCES_KEY, r#"{"currentPath":[],"playedItemIds":[],"legacyFlag":true}"#)
            .unwrap();

        let mut store = PreferenceStore::load(shared.clone());
        store
            .save(PreferencesPatch::played_item_ids(vec!["x".into()]))
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(shared.0.borrow().get(PREFERENCES_KEY).unwrap()).unwrap();
        assert_eq!(raw["legacyFlag"], serde_json::Value::Bool(true));
        assert_eq!(raw["playedItemIds"][0], "x");
    }

    #[test]
    fn failed_write_still_updates_memory() {
        let mut store = PreferenceStore::load(FailingStorage);
        let result = store.save(PreferencesPatch::current_path(vec!["d".into()]));
        assert!(matches!(result, Err(StorageError::Backend(_))));
        assert_eq!(store.get().current_path, vec!["d".to_string()]);
    }
}
