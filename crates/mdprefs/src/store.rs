use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::storage::{KeyValueStore, StorageError};
use crate::{EditorPrefs, PrefKey, PrefTypeError, PrefValue};

/// Callback invoked after preferences change, with the new preferences and
/// the list of preferences that changed.
pub type Listener = Box<dyn FnMut(&EditorPrefs, &[PrefKey]) + Send>;

pub(crate) type SharedListener = Arc<Mutex<Listener>>;

/// Handle returned by [`SettingsStore::subscribe()`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Editor preferences, kept in sync with a persistent key-value store.
///
/// Every mutation that changes a value writes the whole preference set back
/// to storage before returning. If there is no storage, the store works
/// entirely in memory.
pub struct SettingsStore {
    prefs: EditorPrefs,
    storage: Option<Box<dyn KeyValueStore>>,

    listeners: Vec<(ListenerId, SharedListener)>,
    next_listener_id: u64,
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("prefs", &self.prefs)
            .field("persistent", &self.is_persistent())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SettingsStore {
    /// Constructs a store and hydrates it from `storage`.
    ///
    /// `None` means that persistent storage is unavailable; all preferences
    /// then take their defaults and changes are never saved.
    pub fn new(storage: Option<Box<dyn KeyValueStore>>) -> Self {
        let mut ret = Self {
            prefs: EditorPrefs::default(),
            storage,

            listeners: vec![],
            next_listener_id: 0,
        };

        if ret.is_persistent() {
            ret.hydrate();
            ret.persist();
        } else {
            log::debug!("No persistent storage; editor preferences will not be saved");
        }

        ret
    }
    /// Constructs a store backed by `storage`.
    pub fn with_storage(storage: impl KeyValueStore + 'static) -> Self {
        Self::new(Some(Box::new(storage)))
    }
    /// Constructs a store with default preferences and no persistent storage.
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    fn hydrate(&mut self) {
        let Some(storage) = &self.storage else {
            return;
        };
        self.prefs = EditorPrefs::load_from(storage.as_ref());
        log::debug!("Loaded editor preferences: {:?}", self.prefs);
    }

    /// Returns whether changes are saved to persistent storage.
    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    /// Returns the current preferences.
    pub fn prefs(&self) -> &EditorPrefs {
        &self.prefs
    }
    /// Returns the current value of a single preference.
    pub fn get(&self, key: PrefKey) -> PrefValue {
        self.prefs.get(key)
    }

    /// Flips a preference to its other state and persists the result.
    pub fn toggle(&mut self, key: PrefKey) {
        self.update(|prefs| prefs.toggle(key));
    }
    /// Assigns a preference and persists the result.
    pub fn set(&mut self, key: PrefKey, value: PrefValue) -> Result<(), PrefTypeError> {
        self.update(|prefs| prefs.set(key, value))
    }
    /// Restores every preference to its default and persists the result.
    pub fn reset(&mut self) {
        self.update(|prefs| *prefs = EditorPrefs::default());
    }

    /// Modifies preferences using `f`. If anything changed, the full set is
    /// persisted once and listeners are notified.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut EditorPrefs) -> R) -> R {
        let (ret, changed) = self.apply(f);
        if !changed.is_empty() {
            notify(&self.listener_handles(), &self.prefs, &changed);
        }
        ret
    }

    /// Modifies preferences using `f` and persists them if anything changed,
    /// without notifying listeners. Returns the preferences that changed.
    pub(crate) fn apply<R>(&mut self, f: impl FnOnce(&mut EditorPrefs) -> R) -> (R, Vec<PrefKey>) {
        let old = self.prefs.clone();
        let ret = f(&mut self.prefs);

        let changed = old.diff(&self.prefs);
        if !changed.is_empty() {
            log::trace!("Editor preferences changed: {changed:?}");
            self.persist();
        }

        (ret, changed)
    }

    pub(crate) fn listener_handles(&self) -> Vec<SharedListener> {
        self.listeners.iter().map(|(_id, l)| Arc::clone(l)).collect()
    }

    /// Writes every preference to storage, logging any error.
    pub fn persist(&mut self) {
        if let Err(e) = self.try_persist() {
            log::error!("Error saving editor preferences: {e}");
        }
    }
    /// Writes every preference to storage. Does nothing if there is no
    /// storage.
    pub fn try_persist(&mut self) -> Result<(), StorageError> {
        let Some(storage) = &mut self.storage else {
            return Ok(());
        };
        storage.set_many(&self.prefs.entries())
    }

    /// Registers a callback to run after preferences change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&EditorPrefs, &[PrefKey]) + Send + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners
            .push((id, Arc::new(Mutex::new(Box::new(listener)))));
        id
    }
    /// Removes a callback registered with [`Self::subscribe()`]. Returns
    /// `false` if it was already removed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let len_before = self.listeners.len();
        self.listeners.retain(|(i, _)| *i != id);
        self.listeners.len() != len_before
    }
}

/// Runs each listener once. A listener that is already running (because it
/// changed preferences itself) is skipped.
pub(crate) fn notify(listeners: &[SharedListener], prefs: &EditorPrefs, changed: &[PrefKey]) {
    for listener in listeners {
        match listener.try_lock() {
            Some(mut f) => (*f)(prefs, changed),
            None => log::warn!("Skipping reentrant preference listener for {changed:?}"),
        }
    }
}
