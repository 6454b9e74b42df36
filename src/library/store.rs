use crate::{
    common::{discard_cover, EntryId, EntrySelector, LibraryEntry},
    error::{Error, Result},
    library::{LibraryEvent, Observers},
};
use itertools::Itertools;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
    sync::mpsc::Receiver,
};

const APP_DIR: &str = "touchgrass";
const LIBRARY_FILE: &str = "games.json";
const COVERS_DIR: &str = "covers";

/// The user's library of entries, backed by a single JSON document
#[derive(Debug)]
pub struct LibraryStore {
    /// Location of the persisted document
    path: PathBuf,
    /// Folder imported covers are written to
    covers_dir: PathBuf,
    entries: Vec<LibraryEntry>,
    observers: Observers,
}

impl LibraryStore {
    /// Open the library at the given location, loading whatever is stored there
    pub fn open(path: impl Into<PathBuf>, covers_dir: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            covers_dir: covers_dir.into(),
            entries: Vec::new(),
            observers: Observers::default(),
        };
        store.entries = store.load_all();
        store
    }

    /// Open ~/.local/share/touchgrass/games.json
    #[mutants::skip] // Cannot test directly, depends on system state
    pub fn open_default() -> Result<Self> {
        let data_home = xdg::BaseDirectories::with_prefix(APP_DIR)?.get_data_home();
        Ok(Self::open(
            data_home.join(LIBRARY_FILE),
            data_home.join(COVERS_DIR),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn covers_dir(&self) -> &Path {
        &self.covers_dir
    }

    /// Read the persisted document.
    /// A missing, unreadable or malformed file is an empty library.
    pub fn load_all(&self) -> Vec<LibraryEntry> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "failed to read library; starting empty");
                return Vec::new();
            }
        };

        let entries: Vec<LibraryEntry> = serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(path = %self.path.display(), %err, "failed to parse library; starting empty");
            Vec::new()
        });

        // Ids are unique, the first entry with a given id wins
        let stored = entries.len();
        let entries = entries.into_iter().unique_by(|e| e.id).collect_vec();
        if entries.len() < stored {
            tracing::warn!(
                path = %self.path.display(),
                dropped = stored - entries.len(),
                "dropped entries with duplicate ids"
            );
        }
        entries
    }

    /// The current entries, in insertion order
    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    /// Receive an event after every future mutation
    pub fn subscribe(&mut self) -> Receiver<LibraryEvent> {
        self.observers.subscribe()
    }

    pub fn find(&self, id: EntryId) -> Option<&LibraryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Find the single entry a selector names.
    /// A full id wins over a title, which wins over an id prefix.
    pub fn resolve(&self, selector: &EntrySelector) -> Result<&LibraryEntry> {
        if let Some(entry) = EntryId::from_str(selector.as_str())
            .ok()
            .and_then(|id| self.find(id))
        {
            return Ok(entry);
        }

        for matches in [
            EntrySelector::matches_title as fn(&EntrySelector, &LibraryEntry) -> bool,
            EntrySelector::matches_id,
        ] {
            let found = self
                .entries
                .iter()
                .filter(|e| matches(selector, e))
                .collect_vec();

            match found.as_slice() {
                [] => continue,
                [entry] => return Ok(*entry),
                many => {
                    return Err(Error::Ambiguous(selector.to_string(), many.len()))
                }
            }
        }

        Err(Error::NotFound(selector.to_string()))
    }

    /// Entries whose title contains the query, ignoring case.
    /// A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&LibraryEntry> {
        let query = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| query.is_empty() || e.title.to_lowercase().contains(&query))
            .collect()
    }

    /// Append an entry. Returns false, changing nothing, if its id is already taken.
    pub fn add(&mut self, entry: LibraryEntry) -> bool {
        let id = entry.id;
        if self.find(id).is_some() {
            tracing::warn!(%id, "entry with this id already exists; not added");
            return false;
        }

        self.entries.push(entry);
        self.save();
        self.observers.notify(LibraryEvent::Added(id));
        true
    }

    /// Replace the entry with the same id. Returns false, changing nothing, if there is none.
    pub fn update(&mut self, entry: LibraryEntry) -> bool {
        let Some(slot) = self.entries.iter_mut().find(|e| e.id == entry.id) else {
            tracing::debug!(id = %entry.id, "update of unknown entry ignored");
            return false;
        };

        let id = entry.id;
        *slot = entry;
        self.save();
        self.observers.notify(LibraryEvent::Updated(id));
        true
    }

    /// Remove an entry and its cover image
    pub fn remove(&mut self, id: EntryId) -> Option<LibraryEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        let entry = self.entries.remove(index);

        if let Some(cover) = entry.cover_image() {
            discard_cover(cover);
        }
        self.save();
        self.observers.notify(LibraryEvent::Removed(id));

        Some(entry)
    }

    /// Remove every entry and every cover image
    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            if let Some(cover) = entry.cover_image() {
                discard_cover(cover);
            }
        }
        self.save();
        self.observers.notify(LibraryEvent::Cleared);
    }

    /// Persist the whole library. Failures are logged, never returned.
    fn save(&self) {
        if let Err(err) = self.try_save() {
            tracing::warn!(path = %self.path.display(), %err, "failed to save library");
        }
    }

    fn try_save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> LibraryStore {
        LibraryStore::open(
            dir.path().join("touchgrass/games.json"),
            dir.path().join("touchgrass/covers"),
        )
    }

    fn with_cover(dir: &TempDir, title: &str) -> Result<LibraryEntry> {
        let cover = dir.path().join(format!("{title}.png"));
        fs::write(&cover, "png")?;
        let mut entry = LibraryEntry::new(title, format!("/games/{title}"), false);
        entry.cover_image_path = cover;
        Ok(entry)
    }

    #[test]
    fn missing_file_is_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(store(&dir).entries().is_empty());
        Ok(())
    }

    #[test]
    fn corrupt_file_is_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let library = store(&dir);
        fs::create_dir_all(dir.path().join("touchgrass"))?;
        fs::write(library.path(), "[{ not json")?;

        assert!(library.load_all().is_empty());
        assert!(store(&dir).entries().is_empty());
        Ok(())
    }

    #[test]
    fn unreadable_file_is_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        // A directory where the document should be cannot be read as a file
        fs::create_dir_all(dir.path().join("touchgrass/games.json"))?;

        let library = store(&dir);
        assert!(library.entries().is_empty());
        assert!(library.load_all().is_empty());
        Ok(())
    }

    #[test]
    fn duplicate_ids_on_disk_keep_first() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let first = LibraryEntry::new("Portal", "400", true);
        let mut copy = LibraryEntry::new("Portal copy", "400", true);
        copy.id = first.id;
        fs::create_dir_all(dir.path().join("touchgrass"))?;
        fs::write(
            dir.path().join("touchgrass/games.json"),
            serde_json::to_string(&[&first, &copy])?,
        )?;

        assert_eq!(store(&dir).entries(), &[first][..]);
        Ok(())
    }

    #[test]
    fn add_with_existing_id_is_ignored() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut library = store(&dir);
        let entry = LibraryEntry::new("Portal", "400", true);
        assert!(library.add(entry.clone()));
        let events = library.subscribe();

        let mut copy = LibraryEntry::new("Portal again", "400", true);
        copy.id = entry.id;
        assert!(!library.add(copy));

        assert_eq!(library.entries(), &[entry.clone()][..]);
        assert_eq!(store(&dir).entries(), &[entry][..]);
        assert!(events.try_recv().is_err());
        Ok(())
    }

    #[test]
    fn adds_keep_insertion_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut library = store(&dir);
        let first = LibraryEntry::new("Portal", "400", true);
        let second = LibraryEntry::new("Quake", "/games/quake", false);

        library.add(first.clone());
        library.add(second.clone());

        assert_eq!(library.entries(), &[first, second][..]);
        Ok(())
    }

    #[test]
    fn round_trip_through_new_store() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut entry = LibraryEntry::new("Portal 2", "620", true);
        entry.tags = Some(vec!["puzzle".into(), "coop".into()]);
        entry.install_size_bytes = Some(12_000_000_000);

        store(&dir).add(entry.clone());

        let reopened = store(&dir);
        assert_eq!(reopened.entries(), &[entry.clone()][..]);
        assert_eq!(reopened.load_all(), vec![entry]);
        Ok(())
    }

    #[test]
    fn document_is_indented() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut library = store(&dir);
        library.add(LibraryEntry::new("Portal", "400", true));

        let contents = fs::read_to_string(library.path())?;
        assert!(contents.starts_with("[\n  {\n"));
        assert!(contents.contains("\"isProtocolReference\": true"));
        Ok(())
    }

    #[test]
    fn update_replaces_matching_entry() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut library = store(&dir);
        let mut entry = LibraryEntry::new("Portal", "400", true);
        library.add(entry.clone());

        entry.title = "Portal (2007)".into();
        assert!(library.update(entry.clone()));

        assert_eq!(store(&dir).entries(), &[entry][..]);
        Ok(())
    }

    #[test]
    fn update_of_unknown_id_changes_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut library = store(&dir);
        let entry = LibraryEntry::new("Portal", "400", true);
        library.add(entry.clone());
        let events = library.subscribe();

        assert!(!library.update(LibraryEntry::new("Other", "1", true)));

        assert_eq!(library.entries(), &[entry][..]);
        assert!(events.try_recv().is_err());
        Ok(())
    }

    #[test]
    fn remove_deletes_entry_and_cover() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut library = store(&dir);
        let kept = LibraryEntry::new("Portal", "400", true);
        let removed = with_cover(&dir, "quake")?;
        library.add(kept.clone());
        library.add(removed.clone());

        assert_eq!(library.remove(removed.id), Some(removed.clone()));
        assert_eq!(library.entries(), &[kept.clone()][..]);
        assert!(!removed.cover_image_path.exists());

        assert_eq!(library.remove(removed.id), None);
        assert_eq!(library.entries().len(), 1);
        assert_eq!(store(&dir).entries(), &[kept][..]);
        Ok(())
    }

    #[test]
    fn remove_survives_missing_cover() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut library = store(&dir);
        let mut entry = LibraryEntry::new("Doom", "/games/doom", false);
        entry.cover_image_path = dir.path().join("gone.png");
        library.add(entry.clone());

        assert!(library.remove(entry.id).is_some());
        assert!(library.entries().is_empty());
        Ok(())
    }

    #[test]
    fn clear_removes_everything() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut library = store(&dir);
        let entries = [with_cover(&dir, "a")?, with_cover(&dir, "b")?];
        for entry in &entries {
            library.add(entry.clone());
        }

        library.clear();

        assert!(library.entries().is_empty());
        assert!(entries.iter().all(|e| !e.cover_image_path.exists()));
        assert!(store(&dir).entries().is_empty());
        Ok(())
    }

    #[test]
    fn unwritable_library_keeps_memory_state() -> Result<()> {
        let dir = tempfile::tempdir()?;
        // The parent of the document is a regular file, so saving fails
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "")?;
        let mut library =
            LibraryStore::open(blocker.join("games.json"), dir.path().join("covers"));

        library.add(LibraryEntry::new("Portal", "400", true));

        assert_eq!(library.entries().len(), 1);
        assert!(library.load_all().is_empty());
        Ok(())
    }

    #[test]
    fn events_follow_mutations() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut library = store(&dir);
        let events = library.subscribe();
        let entry = LibraryEntry::new("Portal", "400", true);

        library.add(entry.clone());
        library.update(entry.clone());
        library.remove(entry.id);
        library.clear();

        assert_eq!(
            events.try_iter().collect_vec(),
            vec![
                LibraryEvent::Added(entry.id),
                LibraryEvent::Updated(entry.id),
                LibraryEvent::Removed(entry.id),
                LibraryEvent::Cleared,
            ]
        );
        Ok(())
    }

    #[test]
    fn search_filters_titles() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut library = store(&dir);
        for title in ["Portal", "Portal 2", "Half-Life"] {
            library.add(LibraryEntry::new(title, "1", true));
        }

        let titles = |query: &str| {
            library
                .search(query)
                .into_iter()
                .map(|e| e.title.as_str())
                .collect_vec()
        };

        assert_eq!(titles(" portal "), vec!["Portal", "Portal 2"]);
        assert_eq!(titles("LIFE"), vec!["Half-Life"]);
        assert_eq!(titles("   ").len(), 3);
        assert!(titles("doom").is_empty());
        Ok(())
    }

    #[test]
    fn resolve_selectors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut library = store(&dir);
        let portal = LibraryEntry::new("Portal", "400", true);
        let mut twins = [
            LibraryEntry::new("Doom", "/games/doom", false),
            LibraryEntry::new("doom", "/games/doom2", false),
        ];
        twins[1].id = EntryId::from_str("00000000-0000-4000-8000-000000000001")
            .expect("valid uuid");
        library.add(portal.clone());
        for twin in &twins {
            library.add(twin.clone());
        }

        let resolve = |s: &str| library.resolve(&EntrySelector::from_str(s).expect("infallible"));

        assert_eq!(resolve(&portal.id.to_string())?, &portal);
        assert_eq!(resolve("PORTAL")?, &portal);
        assert_eq!(resolve("00000000-0000-4000-8000-000000000001")?, &twins[1]);
        assert_eq!(resolve("00000000-0000")?, &twins[1]);
        assert!(matches!(resolve("DOOM"), Err(Error::Ambiguous(_, 2))));
        assert!(matches!(resolve("quake"), Err(Error::NotFound(_))));
        Ok(())
    }
}
