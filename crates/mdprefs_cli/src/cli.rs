use std::io::Write;
use std::path::PathBuf;

use eyre::{Context, Result};
use mdprefs::{EditorPrefs, FileStorage, KeyValueStore, PrefKey, PrefValue};

/// View and change mdview editor preferences
///
/// Preference names: minimap, wordWrap, lineNumbers, vimMode, statusBar,
/// wordCount.
#[derive(Debug, clap::Parser)]
#[command(version)]
pub(crate) struct Args {
    /// Settings file to use instead of the default location.
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Subcommand,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Subcommand {
    /// Print all preferences as JSON.
    Show,
    /// Print the value of a preference.
    Get {
        /// Preference name (such as `wordWrap`)
        name: PrefKey,
    },
    /// Flip a preference to its other state and print the new value.
    Toggle {
        /// Preference name (such as `wordWrap`)
        name: PrefKey,
    },
    /// Set a preference to `true`/`false` or `on`/`off`.
    Set {
        /// Preference name (such as `wordWrap`)
        name: PrefKey,
        /// New value
        value: String,
    },
    /// Restore every preference to its default.
    Reset,
    /// Print the path of the settings file.
    Path,
}

fn settings_path(file: Option<PathBuf>) -> Result<PathBuf> {
    match file {
        Some(path) => Ok(path),
        None => FileStorage::user_settings_path().wrap_err("error locating settings file"),
    }
}

pub(crate) fn exec(args: Args, out: &mut impl Write) -> Result<()> {
    let path = settings_path(args.file)?;
    let open = || {
        log::debug!("Using settings file {}", path.display());
        let storage = FileStorage::open(&path);
        let prefs = EditorPrefs::load_from(&storage);
        (storage, prefs)
    };
    let save = |storage: &mut FileStorage, prefs: &EditorPrefs| {
        storage
            .set_many(&prefs.entries())
            .wrap_err("error saving settings")
    };

    match args.subcommand {
        Subcommand::Show => {
            let (_, prefs) = open();
            serde_json::to_writer_pretty(&mut *out, &prefs)?;
            writeln!(out)?;
        }

        Subcommand::Get { name } => writeln!(out, "{}", open().1.get(name))?,

        Subcommand::Toggle { name } => {
            let (mut storage, mut prefs) = open();
            prefs.toggle(name);
            save(&mut storage, &prefs)?;
            writeln!(out, "{}", prefs.get(name))?;
        }

        Subcommand::Set { name, value } => {
            let value = PrefValue::parse(name.kind(), &value)?;
            let (mut storage, mut prefs) = open();
            prefs.set(name, value)?;
            save(&mut storage, &prefs)?;
        }

        Subcommand::Reset => {
            let (mut storage, _) = open();
            save(&mut storage, &EditorPrefs::default())?;
        }

        Subcommand::Path => writeln!(out, "{}", path.display())?,
    }

    Ok(())
}
