//! The table of editor preferences.
//!
//! Every preference is declared exactly once, in the `editor_prefs!`
//! invocation at the bottom of this file. The macro generates:
//!
//! - [`EditorPrefs`], a plain struct with one public field per preference
//! - [`PrefKey`], an enum naming each preference
//! - typed `toggle_*()` and `set_*()` methods on [`SettingsStore`]
//!
//! Adding or removing a preference only requires changing the table.
//! Preferences are stored independently under their own key, so an older
//! table with fewer entries reads and writes a subset of the same keys.

use serde::Serialize;
use thiserror::Error;

use crate::{KeyValueStore, PrefKind, PrefType, PrefValue, SettingsStore, Switch};

/// One row of the preference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefSpec {
    /// Preference name.
    pub key: PrefKey,
    /// Key used in the persistent store.
    pub storage_key: &'static str,
    /// Semantic type.
    pub kind: PrefKind,
    /// Compiled-in default.
    pub default: PrefValue,
}

/// Returns every row of the preference table, in declaration order.
pub fn table() -> impl Iterator<Item = PrefSpec> {
    use strum::IntoEnumIterator;

    PrefKey::iter().map(|key| PrefSpec {
        key,
        storage_key: key.storage_key(),
        kind: key.kind(),
        default: key.default_value(),
    })
}

/// Error produced when assigning a value of the wrong kind to a preference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("preference {key} expects a {expected} value, not {actual}")]
pub struct PrefTypeError {
    /// Preference being assigned.
    pub key: PrefKey,
    /// Kind that the preference holds.
    pub expected: PrefKind,
    /// Kind of the rejected value.
    pub actual: PrefKind,
}

macro_rules! editor_prefs {
    (
        $(
            $(#[$attr:meta])*
            $field:ident: $type:ty = $default:expr,
            $key:ident => $storage_key:literal,
            $toggle:ident, $set:ident;
        )*
    ) => {
        /// Current value of every editor preference.
        #[derive(Serialize, Debug, Clone, PartialEq, Eq)]
        #[serde(rename_all = "camelCase")]
        pub struct EditorPrefs {
            $(
                $(#[$attr])*
                pub $field: $type,
            )*
        }

        impl Default for EditorPrefs {
            fn default() -> Self {
                Self {
                    $($field: $default,)*
                }
            }
        }

        /// Name of an editor preference.
        ///
        /// Parses from and displays as the camelCase name, such as `wordWrap`.
        #[derive(
            Debug, Display, EnumString, EnumIter, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[strum(serialize_all = "camelCase")]
        pub enum PrefKey {
            $(
                $(#[$attr])*
                $key,
            )*
        }

        impl PrefKey {
            /// Returns the key under which the preference is persisted.
            pub fn storage_key(self) -> &'static str {
                match self {
                    $(PrefKey::$key => $storage_key,)*
                }
            }

            /// Returns the semantic type of the preference.
            pub fn kind(self) -> PrefKind {
                match self {
                    $(PrefKey::$key => <$type as PrefType>::KIND,)*
                }
            }

            /// Returns the compiled-in default.
            pub fn default_value(self) -> PrefValue {
                match self {
                    $(PrefKey::$key => <$type as PrefType>::into_value($default),)*
                }
            }
        }

        impl EditorPrefs {
            /// Returns the value of a preference.
            pub fn get(&self, key: PrefKey) -> PrefValue {
                match key {
                    $(PrefKey::$key => self.$field.clone().into_value(),)*
                }
            }

            /// Assigns a preference, checking that `value` has the right kind.
            pub fn set(&mut self, key: PrefKey, value: PrefValue) -> Result<(), PrefTypeError> {
                let actual = value.kind();
                match key {
                    $(PrefKey::$key => {
                        self.$field = <$type as PrefType>::from_value(value).ok_or(
                            PrefTypeError { key, expected: key.kind(), actual },
                        )?;
                    })*
                }
                Ok(())
            }

            /// Flips a preference to its other state.
            pub fn toggle(&mut self, key: PrefKey) {
                match key {
                    $(PrefKey::$key => self.$field.toggle(),)*
                }
            }

            /// Returns the string persisted for a preference.
            pub fn encode(&self, key: PrefKey) -> String {
                match key {
                    $(PrefKey::$key => self.$field.encode(),)*
                }
            }

            /// Assigns a preference from a string read from storage.
            pub fn load_raw(&mut self, key: PrefKey, raw: &str) {
                match key {
                    $(PrefKey::$key => self.$field = <$type as PrefType>::decode(raw),)*
                }
            }
        }

        impl SettingsStore {
            $(
                #[doc = concat!("Toggles `", stringify!($field), "` and persists the result.")]
                pub fn $toggle(&mut self) {
                    self.toggle(PrefKey::$key);
                }

                #[doc = concat!("Sets `", stringify!($field), "` and persists the result.")]
                pub fn $set(&mut self, value: impl Into<$type>) {
                    let value = value.into();
                    self.update(|prefs| prefs.$field = value);
                }
            )*
        }
    };
}

impl EditorPrefs {
    /// Reads preferences from `storage` without writing anything back.
    /// Preferences missing from `storage` take their defaults.
    pub fn load_from(storage: &(impl KeyValueStore + ?Sized)) -> Self {
        use strum::IntoEnumIterator;

        let mut prefs = Self::default();
        for key in PrefKey::iter() {
            let Some(raw) = storage.get(key.storage_key()) else {
                continue;
            };
            prefs.load_raw(key, &raw);
            if let PrefValue::Switch(s) = prefs.get(key)
                && !s.is_recognized()
            {
                log::warn!("Unrecognized value {raw:?} for preference {key}");
            }
        }
        prefs
    }

    /// Returns the preferences whose values differ between `self` and
    /// `other`.
    pub fn diff(&self, other: &Self) -> Vec<PrefKey> {
        use strum::IntoEnumIterator;

        PrefKey::iter()
            .filter(|&key| self.get(key) != other.get(key))
            .collect()
    }

    /// Returns the storage key and encoded value of every preference.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        use strum::IntoEnumIterator;

        PrefKey::iter()
            .map(|key| (key.storage_key(), self.encode(key)))
            .collect()
    }
}

editor_prefs! {
    /// Whether the minimap is shown beside the editor.
    minimap: bool = false,
    Minimap => "editor.minimap",
    toggle_minimap, set_minimap;

    /// Whether long lines wrap.
    word_wrap: Switch = Switch::on(),
    WordWrap => "editor.wordWrap",
    toggle_word_wrap, set_word_wrap;

    /// Whether line numbers are shown in the gutter.
    line_numbers: Switch = Switch::on(),
    LineNumbers => "editor.lineNumbers",
    toggle_line_numbers, set_line_numbers;

    /// Whether vim keybindings are enabled.
    vim_mode: bool = false,
    VimMode => "editor.vimMode",
    toggle_vim_mode, set_vim_mode;

    /// Whether the status bar is shown.
    status_bar: bool = true,
    StatusBar => "editor.statusBar",
    toggle_status_bar, set_status_bar;

    /// Whether the word count is shown in the status bar.
    word_count: bool = false,
    WordCount => "editor.wordCount",
    toggle_word_count, set_word_count;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_table_matches_defaults() {
        let defaults = EditorPrefs::default();
        for spec in table() {
            assert_eq!(spec.default, defaults.get(spec.key), "{}", spec.key);
            assert_eq!(spec.kind, spec.default.kind(), "{}", spec.key);
        }
    }

    #[test]
    fn test_storage_keys() {
        let keys = table().map(|spec| spec.storage_key).collect::<Vec<_>>();
        assert_eq!(
            keys,
            [
                "editor.minimap",
                "editor.wordWrap",
                "editor.lineNumbers",
                "editor.vimMode",
                "editor.statusBar",
                "editor.wordCount",
            ],
        );
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in PrefKey::iter() {
            let name = key.to_string();
            assert_eq!(key.storage_key(), format!("editor.{name}"));
            assert_eq!(name.parse::<PrefKey>(), Ok(key));
        }
        assert!("word_wrap".parse::<PrefKey>().is_err());
    }

    #[test]
    fn test_set_checks_kind() {
        let mut prefs = EditorPrefs::default();
        prefs.set(PrefKey::VimMode, PrefValue::Bool(true)).unwrap();
        assert!(prefs.vim_mode);

        let err = prefs
            .set(PrefKey::WordWrap, PrefValue::Bool(false))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "preference wordWrap expects a switch value, not bool",
        );
        assert_eq!(prefs.word_wrap, Switch::on());
    }

    #[test]
    fn test_diff() {
        let a = EditorPrefs::default();
        let mut b = a.clone();
        assert!(a.diff(&b).is_empty());
        b.toggle(PrefKey::StatusBar);
        b.toggle(PrefKey::LineNumbers);
        assert_eq!(a.diff(&b), [PrefKey::LineNumbers, PrefKey::StatusBar]);
    }

    #[test]
    fn test_load_from_does_not_write() {
        let storage = crate::MemoryStorage::with_entries([
            ("editor.vimMode", "true"),
            ("editor.wordWrap", "off"),
        ]);
        let prefs = EditorPrefs::load_from(&storage);
        assert!(prefs.vim_mode);
        assert_eq!(prefs.word_wrap, Switch::off());
        assert!(prefs.status_bar);
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_load_raw() {
        let mut prefs = EditorPrefs::default();
        prefs.load_raw(PrefKey::StatusBar, "nope");
        prefs.load_raw(PrefKey::LineNumbers, "relative");
        assert!(!prefs.status_bar);
        assert_eq!(prefs.encode(PrefKey::LineNumbers), "relative");
    }
}
