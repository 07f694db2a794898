use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::storage::{FileStorage, StorageError};
use crate::store::notify;
use crate::{EditorPrefs, ListenerId, PrefKey, PrefTypeError, PrefValue, SettingsStore};

/// Shared handle to a [`SettingsStore`].
///
/// Cloning the handle does not clone the store. Construct one at startup and
/// pass it to whatever needs to read or change preferences.
///
/// Mutations through the handle notify listeners after the store is
/// unlocked, so listeners may read or change preferences through any clone of
/// the handle.
#[derive(Debug, Clone)]
pub struct Settings {
    store: Arc<Mutex<SettingsStore>>,
}

impl From<SettingsStore> for Settings {
    fn from(store: SettingsStore) -> Self {
        Self::new(store)
    }
}

impl Settings {
    /// Wraps a store in a shared handle.
    pub fn new(store: SettingsStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
    /// Returns a handle to a fresh store with no persistent storage.
    pub fn in_memory() -> Self {
        Self::new(SettingsStore::in_memory())
    }
    /// Returns a handle to a store backed by the user's settings file.
    ///
    /// If the settings file cannot be located, the store works in memory.
    pub fn open_user_settings() -> Self {
        Self::open_or_in_memory(FileStorage::open_user_settings())
    }
    fn open_or_in_memory(storage: Result<FileStorage, StorageError>) -> Self {
        match storage {
            Ok(storage) => Self::new(SettingsStore::with_storage(storage)),
            Err(e) => {
                log::warn!("{e}; editor preferences will not be saved");
                Self::in_memory()
            }
        }
    }

    /// Locks the store for reading or writing.
    ///
    /// Mutations made through the guard run listeners while the store is
    /// still locked, so those listeners must not use this handle.
    pub fn lock(&self) -> MutexGuard<'_, SettingsStore> {
        self.store.lock()
    }

    /// Returns a copy of the current preferences.
    pub fn snapshot(&self) -> EditorPrefs {
        self.lock().prefs().clone()
    }
    /// Returns whether changes are saved to persistent storage.
    pub fn is_persistent(&self) -> bool {
        self.lock().is_persistent()
    }

    /// Flips a preference to its other state and persists the result.
    pub fn toggle(&self, key: PrefKey) {
        self.update(|prefs| prefs.toggle(key));
    }
    /// Assigns a preference and persists the result.
    pub fn set(&self, key: PrefKey, value: PrefValue) -> Result<(), PrefTypeError> {
        self.update(|prefs| prefs.set(key, value))
    }
    /// Restores every preference to its default and persists the result.
    pub fn reset(&self) {
        self.update(|prefs| *prefs = EditorPrefs::default());
    }
    /// Modifies preferences using `f`. If anything changed, the full set is
    /// persisted once and listeners are notified.
    pub fn update<R>(&self, f: impl FnOnce(&mut EditorPrefs) -> R) -> R {
        let mut store = self.lock();
        let (ret, changed) = store.apply(f);
        if changed.is_empty() {
            return ret;
        }
        let prefs = store.prefs().clone();
        let listeners = store.listener_handles();
        drop(store);

        notify(&listeners, &prefs, &changed);
        ret
    }

    /// Registers a callback to run after preferences change.
    pub fn subscribe(
        &self,
        listener: impl FnMut(&EditorPrefs, &[PrefKey]) + Send + 'static,
    ) -> ListenerId {
        self.lock().subscribe(listener)
    }
    /// Removes a callback registered with [`Self::subscribe()`]. Returns
    /// `false` if it was already removed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.lock().unsubscribe(id)
    }

    /// Returns whether two handles refer to the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlocatable_settings_fall_back_to_memory() {
        let settings =
            Settings::open_or_in_memory(Err(StorageError::NoLocation("no home".to_owned())));
        assert!(!settings.is_persistent());

        settings.toggle(PrefKey::Minimap);
        assert!(settings.snapshot().minimap);
    }

    #[test]
    fn test_located_settings_are_persistent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        let settings = Settings::open_or_in_memory(Ok(FileStorage::open(&path)));
        assert!(settings.is_persistent());
        assert!(path.exists());
    }
}
