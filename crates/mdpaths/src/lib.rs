//! Filesystem locations used by mdview.
//!
//! The settings directory is resolved once per process. It can be overridden
//! with the environment variable [`SETTINGS_DIR_ENV_VAR`], which is mostly
//! useful for tests and portable installs.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use eyre::{Result, eyre};

#[macro_use]
extern crate lazy_static;

/// Environment variable that overrides the settings directory.
pub const SETTINGS_DIR_ENV_VAR: &str = "MDVIEW_SETTINGS_DIR";

const APP_NAME: &str = "mdview";
const SETTINGS_FILE_NAME: &str = "settings.yaml";

lazy_static! {
    static ref SETTINGS_DIR: Result<PathBuf, String> = find_settings_dir();
}

fn find_settings_dir() -> Result<PathBuf, String> {
    settings_dir_with_override(std::env::var_os(SETTINGS_DIR_ENV_VAR))
}

fn settings_dir_with_override(dir_override: Option<OsString>) -> Result<PathBuf, String> {
    if let Some(dir) = dir_override.filter(|s| !s.is_empty()) {
        log::info!("Using settings directory from ${SETTINGS_DIR_ENV_VAR}");
        return Ok(PathBuf::from(dir));
    }

    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| "unable to locate user config directory".to_owned())
}

/// Returns the directory containing user settings.
pub fn settings_dir() -> Result<&'static Path> {
    SETTINGS_DIR.as_deref().map_err(|e| eyre!("{e}"))
}

/// Returns the path of the user settings file.
///
/// The file may not exist yet.
pub fn settings_file() -> Result<PathBuf> {
    Ok(settings_dir()?.join(SETTINGS_FILE_NAME))
}

/// Moves a file out of the way so that a fresh one can be written in its
/// place. Errors are logged and otherwise ignored.
///
/// Existing backups are never overwritten.
pub fn move_to_backup_file(path: impl AsRef<Path>) {
    let path = path.as_ref();
    if !path.exists() {
        return;
    }

    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    let Some(backup_path) = (0..MAX_BACKUPS_PER_SECOND)
        .map(|n| backup_file_path(path, now, n))
        .find(|p| !p.exists())
    else {
        log::error!("Too many backups of {}; leaving it in place", path.display());
        return;
    };
    match std::fs::rename(path, &backup_path) {
        Ok(()) => log::info!("Moved {} to {}", path.display(), backup_path.display()),
        Err(e) => log::error!("Error moving {} to backup: {e}", path.display()),
    }
}

const MAX_BACKUPS_PER_SECOND: u32 = 1000;

/// Returns the path that [`move_to_backup_file()`] would move `path` to at
/// time `now`. `n` distinguishes backups made within the same second and is
/// omitted when zero.
pub fn backup_file_path(path: &Path, now: time::OffsetDateTime, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut timestamp = format!(
        "{:04}-{:02}-{:02}_{:02}-{:02}-{:02}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
    );
    if n > 0 {
        timestamp += &format!("_{n}");
    }
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}_{timestamp}.bak.{}", ext.to_string_lossy()),
        None => format!("{stem}_{timestamp}.bak"),
    };
    path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timestamp() -> time::OffsetDateTime {
        time::OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    #[test]
    fn test_backup_file_path() {
        let path = Path::new("/tmp/mdview/settings.yaml");
        assert_eq!(
            backup_file_path(path, timestamp(), 0),
            Path::new("/tmp/mdview/settings_2023-11-14_22-13-20.bak.yaml"),
        );
        assert_eq!(
            backup_file_path(path, timestamp(), 2),
            Path::new("/tmp/mdview/settings_2023-11-14_22-13-20_2.bak.yaml"),
        );
    }

    #[test]
    fn test_backup_file_path_without_extension() {
        let path = Path::new("settings");
        assert_eq!(
            backup_file_path(path, timestamp(), 0),
            Path::new("settings_2023-11-14_22-13-20.bak"),
        );
    }

    #[test]
    fn test_move_missing_file_is_noop() {
        move_to_backup_file("/definitely/not/a/real/settings.yaml");
    }

    #[test]
    fn test_repeated_backups_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        for contents in ["first", "second", "third"] {
            std::fs::write(&path, contents).unwrap();
            move_to_backup_file(&path);
            assert!(!path.exists());
        }

        let mut backups = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
            .collect::<Vec<_>>();
        backups.sort();
        assert_eq!(backups, ["first", "second", "third"]);
    }

    #[test]
    fn test_settings_dir_override() {
        let dir = settings_dir_with_override(Some("/opt/mdview/settings".into()));
        assert_eq!(dir, Ok(PathBuf::from("/opt/mdview/settings")));

        // An empty override is ignored.
        let default_dir = settings_dir_with_override(None);
        assert_eq!(settings_dir_with_override(Some(OsString::new())), default_dir);
    }
}
