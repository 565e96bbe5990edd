use gloo_storage::{LocalStorage, Storage};

use super::{StorageBackend, StorageError};

/// `window.localStorage`, shared with the JavaScript version of the card.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl StorageBackend for BrowserStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|err| StorageError::backend(format!("{err:?}")))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| StorageError::backend(format!("{err:?}")))
    }
}
