//! Persistent key-value stores that preferences are saved to.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use thiserror::Error;

mod file;

pub use file::FileStorage;

/// Error produced when writing to a [`KeyValueStore`].
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),
    /// The user settings file could not be located
    #[error("unable to locate settings file: {0}")]
    NoLocation(String),
}

/// String key-value store, such as browser local storage or a settings file.
pub trait KeyValueStore: Send {
    /// Returns the value stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Stores several entries. Stores that write to disk should override this
    /// to write once.
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// In-memory key-value store.
///
/// Clones share the same contents, so a clone can be kept around to inspect
/// what was written or to hydrate another store from it.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: Arc<Mutex<IndexMap<String, String>>>,
}

impl MemoryStorage {
    /// Returns an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a store containing `entries`.
    pub fn with_entries<K: Into<String>, V: Into<String>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Returns a copy of all entries, in insertion order.
    pub fn snapshot(&self) -> IndexMap<String, String> {
        self.entries.lock().clone()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Removes an entry, returning its old value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.lock().shift_remove(key)
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let mut map = self.entries.lock();
        for (key, value) in entries {
            map.insert((*key).to_owned(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let a = MemoryStorage::new();
        let mut b = a.clone();
        b.set("editor.minimap", "true").unwrap();
        assert_eq!(a.get("editor.minimap").as_deref(), Some("true"));
        assert_eq!(a.len(), 1);

        b.set_many(&[("editor.minimap", "false".to_owned()), ("editor.vimMode", "true".to_owned())])
            .unwrap();
        assert_eq!(a.get("editor.minimap").as_deref(), Some("false"));
        assert_eq!(a.remove("editor.vimMode").as_deref(), Some("true"));
        assert_eq!(b.get("editor.vimMode"), None);
    }
}
