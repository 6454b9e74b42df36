use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::mpsc::Receiver,
};
use tabled::Tabled;

use crate::{
    common::{
        discard_cover, has_steam_scheme, import_cover, render_table, Dispatcher,
        EntrySelector, LaunchTarget, LibraryEntry,
    },
    config::config_file::ConfigFile,
    error::{Error, Result},
    library::{LibraryEvent, LibraryStore},
    utils,
};

/// A single struct that holds the library, the dispatcher and config.
/// Built once in `main` and passed to every command.
#[derive(Debug)]
pub struct Config {
    /// The user's library
    library: LibraryStore,
    /// Starts entries
    dispatcher: Dispatcher,
    /// touchgrass.toml
    config: ConfigFile,
    /// Library change notifications, drained after every command
    events: Receiver<LibraryEvent>,
    /// Whether or not stdout is a terminal
    pub terminal_output: bool,
}

/// Options for `Config::add_entry`
#[derive(Debug, Default, Clone)]
pub struct NewEntry {
    pub path: String,
    pub title: Option<String>,
    pub protocol: bool,
    pub cover: Option<PathBuf>,
    pub tags: Vec<String>,
}

impl Config {
    /// Load the config file and the default library
    pub fn new() -> Result<Self> {
        let config = ConfigFile::load();
        let terminal_output = std::io::stdout().is_terminal();

        // Config's errors are not able to be handled by `main`'s similar error handling
        if let Err(ref e) = config {
            if !terminal_output {
                utils::notify("touchgrass error", &e.to_string())?
            }
        }

        let config = config?;
        let dispatcher = Dispatcher::new(config.opener()?);
        Ok(Self::from_parts(
            config,
            LibraryStore::open_default()?,
            dispatcher,
            terminal_output,
        ))
    }

    /// Assemble a `Config` from already constructed pieces
    pub fn from_parts(
        config: ConfigFile,
        mut library: LibraryStore,
        dispatcher: Dispatcher,
        terminal_output: bool,
    ) -> Self {
        tracing::debug!(path = %library.path().display(), entries = library.entries().len(), "opened library");
        let events = library.subscribe();
        Self {
            library,
            dispatcher,
            config,
            events,
            terminal_output,
        }
    }

    /// Add a new entry and write its id
    pub fn add_entry<W: Write>(
        &mut self,
        writer: &mut W,
        new: NewEntry,
    ) -> Result<()> {
        let protocol = new.protocol || looks_like_protocol(&new.path);

        let executable_path = if protocol {
            new.path.trim().to_owned()
        } else {
            let path = Path::new(&new.path);
            if !path.is_file() {
                return Err(Error::MissingExecutable(path.to_path_buf()));
            }
            std::path::absolute(path)?.to_string_lossy().into_owned()
        };

        let title = match new.title {
            Some(title) => non_empty_title(&title)?,
            None => default_title(&executable_path, protocol),
        };

        let mut entry = LibraryEntry::new(title, executable_path, protocol);
        entry.tags = (!new.tags.is_empty()).then_some(new.tags);

        let cover_source = new
            .cover
            .or_else(|| (!protocol).then(|| PathBuf::from(&entry.executable_path)));
        if let Some(cover) = cover_source.and_then(|source| {
            import_cover(
                &source,
                self.library.covers_dir(),
                self.config.cover_options(),
            )
        }) {
            entry.cover_image_path = cover;
        }

        let id = entry.id;
        if self.library.add(entry) {
            writeln!(writer, "{id}")?;
        }
        Ok(())
    }

    /// Print the library, optionally filtered by title
    pub fn print<W: Write>(
        &self,
        writer: &mut W,
        search: Option<&str>,
        output_json: bool,
    ) -> Result<()> {
        let entries = self.library.search(search.unwrap_or_default());

        if output_json {
            writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
        } else {
            let rows = entries.into_iter().map(EntryRow::new).collect::<Vec<_>>();
            writeln!(writer, "{}", render_table(&rows, self.terminal_output))?;
        }

        Ok(())
    }

    /// Print a single entry and where launching it would go
    pub fn show<W: Write>(
        &self,
        writer: &mut W,
        selector: &EntrySelector,
        output_json: bool,
    ) -> Result<()> {
        let entry = self.library.resolve(selector)?;

        if output_json {
            writeln!(writer, "{}", serde_json::to_string_pretty(entry)?)?;
            return Ok(());
        }

        writeln!(writer, "id:     {}", entry.id)?;
        writeln!(writer, "title:  {}", entry.title)?;
        writeln!(writer, "kind:   {}", entry.kind())?;
        writeln!(writer, "path:   {}", entry.executable_path)?;
        writeln!(writer, "target: {}", describe_target(&LaunchTarget::resolve(entry)))?;
        if let Some(cover) = entry.cover_image() {
            writeln!(writer, "cover:  {}", cover.display())?;
        }
        if let Some(tags) = &entry.tags {
            writeln!(writer, "tags:   {}", tags.join(", "))?;
        }

        Ok(())
    }

    /// Start the selected entry
    pub fn launch(&self, selector: &EntrySelector) -> Result<()> {
        let entry = self.library.resolve(selector)?;
        Ok(self.dispatcher.launch(entry)?)
    }

    /// Give the selected entry a new title
    pub fn rename(&mut self, selector: &EntrySelector, title: &str) -> Result<()> {
        let mut entry = self.library.resolve(selector)?.clone();
        entry.title = non_empty_title(title)?;
        self.library.update(entry);
        Ok(())
    }

    /// Import a new cover for the selected entry.
    /// The entry is left untouched if the image cannot be read.
    pub fn set_cover(&mut self, selector: &EntrySelector, image: &Path) -> Result<()> {
        let mut entry = self.library.resolve(selector)?.clone();
        let cover = import_cover(
            image,
            self.library.covers_dir(),
            self.config.cover_options(),
        )
        .ok_or_else(|| Error::NoCover(image.to_path_buf()))?;

        if let Some(old) = entry.cover_image() {
            discard_cover(old);
        }
        entry.cover_image_path = cover;
        self.library.update(entry);
        Ok(())
    }

    /// Remove the selected entry
    pub fn remove(&mut self, selector: &EntrySelector) -> Result<()> {
        let id = self.library.resolve(selector)?.id;
        self.library.remove(id);
        Ok(())
    }

    /// Remove everything, only when confirmed
    pub fn clear(&mut self, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(Error::Unconfirmed);
        }
        self.library.clear();
        Ok(())
    }

    /// Consume pending library events, returning them in order
    pub fn drain_events(&self) -> Vec<LibraryEvent> {
        self.events
            .try_iter()
            .inspect(|event| tracing::debug!(?event, "library event"))
            .collect()
    }
}

/// Whether a path given to `add` is a protocol reference
fn looks_like_protocol(path: &str) -> bool {
    let path = path.trim();
    (!path.is_empty() && path.chars().all(|c| c.is_ascii_digit()))
        || has_steam_scheme(path)
}

fn non_empty_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        Err(Error::EmptyTitle)
    } else {
        Ok(title.to_owned())
    }
}

/// The file name without extension, or the reference itself
fn default_title(executable_path: &str, protocol: bool) -> String {
    if protocol {
        return executable_path.to_owned();
    }
    Path::new(executable_path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| executable_path.to_owned())
}

fn describe_target(target: &LaunchTarget) -> String {
    match target {
        LaunchTarget::ProtocolTarget(protocol) => protocol.uri.clone(),
        LaunchTarget::ExecutableTarget(exe) => match exe.working_dir() {
            Some(dir) => format!("{} (in {})", exe.path.display(), dir.display()),
            None => exe.path.display().to_string(),
        },
    }
}

/// Internal helper struct for turning entries into tabular data
#[derive(Tabled)]
struct EntryRow {
    id: String,
    title: String,
    kind: &'static str,
    path: String,
}

impl EntryRow {
    fn new(entry: &LibraryEntry) -> Self {
        Self {
            // Enough of the id to select the entry
            id: entry.id.to_string().chars().take(8).collect(),
            title: entry.title.clone(),
            kind: entry.kind(),
            path: entry.executable_path.clone(),
        }
    }
}
