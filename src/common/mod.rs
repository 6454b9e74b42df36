mod covers;
mod entry;
mod launch;
mod table;

pub use covers::{discard_cover, import_cover, CoverOptions};
pub use entry::{EntryId, EntrySelector, LibraryEntry};
pub use launch::{Dispatcher, LaunchTarget, Opener};
pub(crate) use launch::has_steam_scheme;
pub use table::render_table;

#[cfg(test)]
pub(crate) use launch::testing;
