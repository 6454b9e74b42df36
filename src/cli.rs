use crate::{common::EntrySelector, library::LibraryStore};
use clap::{builder::StyledStr, Parser};
use clap_complete::{
    engine::{ArgValueCompleter, CompletionCandidate},
    PathCompleter,
};
use std::path::PathBuf;

/// Touch grass, then launch a game
///
/// A small personal launcher for games and applications.
/// Entries are either executables on disk or Steam protocol references.
///
/// Wherever an <ENTRY> is expected, it may be given as its id,
/// a unique prefix of its id, or its title (case-insensitive).
#[deny(missing_docs)]
#[derive(Parser)]
#[clap(disable_help_subcommand = true)]
#[clap(version, about)]
pub enum Cmd {
    /// Add a game or application to the library
    ///
    /// A path starting with `steam://`, or a bare Steam app id such as `480`,
    /// is stored as a protocol reference and opened through the system's URI handler.
    /// Anything else must be an existing executable.
    ///
    /// A cover is imported from `--cover` if given,
    /// otherwise from the path itself when it happens to be an image.
    Add {
        /// Executable path, Steam app id or steam:// URI
        #[clap(add = ArgValueCompleter::new(PathCompleter::any()))]
        path: String,
        /// Display name, defaults to the file name without extension
        #[clap(long, short)]
        title: Option<String>,
        /// Treat the path as a protocol reference even if it does not look like one
        #[clap(long, short)]
        protocol: bool,
        /// Image to use as the cover
        #[clap(long, short, add = ArgValueCompleter::new(PathCompleter::file()))]
        cover: Option<PathBuf>,
        /// Tag to attach to the entry, may be repeated
        #[clap(long = "tag")]
        tags: Vec<String>,
    },

    /// List the library
    ///
    /// Output is a table, or tab-delimited text when piped.
    ///
    /// When using `--json`, output is the same array of entries as the library file:
    ///
    /// [
    ///   {
    ///     "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
    ///     "title": "Portal",
    ///     "executablePath": "400",
    ///     "coverImagePath": "",
    ///     "isProtocolReference": true
    ///   },
    ///   ...
    /// ]
    #[clap(verbatim_doc_comment)]
    List {
        /// Output entries as json
        #[clap(long)]
        json: bool,
        /// Only show entries whose title contains this text
        #[clap(long, short)]
        search: Option<String>,
    },

    /// Show a single entry and what launching it would run
    Show {
        /// Entry to show
        #[clap(add = ArgValueCompleter::new(autocomplete_entries))]
        entry: EntrySelector,
        /// Output the entry as json
        #[clap(long)]
        json: bool,
    },

    /// Launch an entry
    ///
    /// Protocol references are opened with the configured `opener`
    /// from ~/.config/touchgrass/touchgrass.toml, or the platform default.
    /// Executables are started from their own folder.
    Launch {
        /// Entry to launch
        #[clap(add = ArgValueCompleter::new(autocomplete_entries))]
        entry: EntrySelector,
    },

    /// Rename an entry
    Rename {
        /// Entry to rename
        #[clap(add = ArgValueCompleter::new(autocomplete_entries))]
        entry: EntrySelector,
        /// New title
        title: String,
    },

    /// Replace the cover image of an entry
    SetCover {
        /// Entry to change
        #[clap(add = ArgValueCompleter::new(autocomplete_entries))]
        entry: EntrySelector,
        /// Image to import
        #[clap(add = ArgValueCompleter::new(PathCompleter::file()))]
        image: PathBuf,
    },

    /// Remove an entry and its cover image
    Remove {
        /// Entry to remove
        #[clap(add = ArgValueCompleter::new(autocomplete_entries))]
        entry: EntrySelector,
    },

    /// Remove every entry and every cover image
    Clear {
        /// Confirm clearing the whole library
        #[clap(long)]
        yes: bool,
    },
}

/// Generate candidates from the titles in the library
#[mutants::skip] // Cannot test directly, relies on system state
fn autocomplete_entries(current: &std::ffi::OsStr) -> Vec<CompletionCandidate> {
    let Ok(library) = LibraryStore::open_default() else {
        return Vec::new();
    };
    let current = current.to_string_lossy().to_lowercase();

    library
        .entries()
        .iter()
        .filter(|entry| entry.title.to_lowercase().starts_with(&current))
        .map(|entry| {
            CompletionCandidate::new(entry.title.clone())
                .help(Some(StyledStr::from(entry.id.to_string())))
        })
        .collect()
}
