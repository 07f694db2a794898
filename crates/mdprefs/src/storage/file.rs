use std::fmt::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::{KeyValueStore, StorageError};

/// Key-value store backed by a flat YAML map on disk.
///
/// The whole file is read once when opened and rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: IndexMap<String, String>,
}

impl FileStorage {
    /// Opens the settings file at `path`.
    ///
    /// A missing file is treated as empty. A file that cannot be read or
    /// parsed is moved to a backup location and also treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read(&path) {
            Ok(Some(entries)) => {
                log::debug!("Loaded {} settings from {}", entries.len(), path.display());
                entries
            }
            Ok(None) => {
                log::debug!("No settings file at {}", path.display());
                IndexMap::new()
            }
            Err(e) => {
                log::warn!("Error loading settings from {}: {e}", path.display());
                mdpaths::move_to_backup_file(&path);
                IndexMap::new()
            }
        };
        Self { path, entries }
    }

    /// Returns the path of the user settings file.
    pub fn user_settings_path() -> Result<PathBuf, StorageError> {
        mdpaths::settings_file().map_err(|e| StorageError::NoLocation(e.to_string()))
    }
    /// Opens the user settings file.
    pub fn open_user_settings() -> Result<Self, StorageError> {
        Ok(Self::open(Self::user_settings_path()?))
    }

    fn read(path: &Path) -> Result<Option<IndexMap<String, String>>, StorageError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Some(IndexMap::new()));
        }
        Ok(Some(serde_norway::from_str(&contents)?))
    }

    /// Returns the path of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StorageError> {
        if let Some(p) = self.path.parent() {
            std::fs::create_dir_all(p)?;
        }
        std::fs::write(&self.path, self.to_yaml())?;
        Ok(())
    }

    /// Every key and value is written as a double-quoted scalar, so that
    /// strings such as `on` are not read back as booleans by YAML 1.1 tools.
    fn to_yaml(&self) -> String {
        let mut yaml = String::new();
        for (key, value) in &self.entries {
            // JSON strings are valid double-quoted YAML scalars.
            let key = serde_json::Value::from(key.as_str());
            let value = serde_json::Value::from(value.as_str());
            let _ = writeln!(yaml, "{key}: {value}");
        }
        yaml
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.save()
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.entries.insert((*key).to_owned(), value.clone());
        }
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("settings.yaml"));
        assert_eq!(storage.get("editor.minimap"), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.yaml");

        let mut storage = FileStorage::open(&path);
        storage.set("editor.vimMode", "true").unwrap();
        storage
            .set_many(&[
                ("editor.wordWrap", "off".to_owned()),
                ("editor.vimMode", "false".to_owned()),
            ])
            .unwrap();
        assert!(path.exists());

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get("editor.vimMode").as_deref(), Some("false"));
        assert_eq!(reopened.get("editor.wordWrap").as_deref(), Some("off"));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_reads_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "editor.minimap: 'true'\neditor.lineNumbers: relative\n").unwrap();

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get("editor.minimap").as_deref(), Some("true"));
        assert_eq!(storage.get("editor.lineNumbers").as_deref(), Some("relative"));
    }

    #[test]
    fn test_values_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");

        let mut storage = FileStorage::open(&path);
        storage
            .set_many(&[
                ("editor.wordWrap", "on".to_owned()),
                ("editor.vimMode", "false".to_owned()),
                ("editor.lineNumbers", "it's \"odd\"\n".to_owned()),
            ])
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "\"editor.wordWrap\": \"on\"\n\
             \"editor.vimMode\": \"false\"\n\
             \"editor.lineNumbers\": \"it's \\\"odd\\\"\\n\"\n",
        );

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get("editor.wordWrap").as_deref(), Some("on"));
        assert_eq!(
            reopened.get("editor.lineNumbers").as_deref(),
            Some("it's \"odd\"\n"),
        );
    }

    #[test]
    fn test_unquoted_switch_survives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "editor.wordWrap: on\neditor.lineNumbers: off\n").unwrap();

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get("editor.wordWrap").as_deref(), Some("on"));
        assert_eq!(storage.get("editor.lineNumbers").as_deref(), Some("off"));
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "- this\n- is a list\n").unwrap();

        let mut storage = FileStorage::open(&path);
        assert_eq!(storage.get("this"), None);
        assert!(!path.exists());
        let backups = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(backups, 1);

        storage.set("editor.minimap", "true").unwrap();
        assert!(path.exists());
    }
}
