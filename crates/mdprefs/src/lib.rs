//! Editor preferences for mdview.
//!
//! [`SettingsStore`] holds the current [`EditorPrefs`], loads them from a
//! [`KeyValueStore`] when constructed and writes the full set back after every
//! change. Consumers share a store through a [`Settings`] handle.
//!
//! Each preference is persisted as a string under its own key, such as
//! `editor.wordWrap`. Booleans are stored as `"true"` or `"false"`, and
//! on/off preferences as `"on"` or `"off"`.
//!
//! ```
//! use mdprefs::{MemoryStorage, SettingsStore, Switch};
//!
//! let storage = MemoryStorage::new();
//! let mut store = SettingsStore::with_storage(storage.clone());
//! store.toggle_word_wrap();
//! assert_eq!(store.prefs().word_wrap, Switch::off());
//! assert_eq!(storage.snapshot()["editor.wordWrap"], "off");
//! ```

#[macro_use]
extern crate strum;

mod context;
mod prefs;
pub mod storage;
mod store;
mod value;


pub use context::Settings;
pub use prefs::{EditorPrefs, PrefKey, PrefSpec, PrefTypeError, table};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, StorageError};
pub use store::{Listener, ListenerId, SettingsStore};
pub use value::{ParseValueError, PrefKind, PrefType, PrefValue, Switch};
