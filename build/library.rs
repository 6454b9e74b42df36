// This file exists solely to trick build script into working
// These types are used by cli.rs, which cannot be transitively imported
// because they rely on their own dependencies and so on

use std::error::Error;

pub struct LibraryStore;
pub struct LibraryEntry {
    pub id: String,
    pub title: String,
}

impl LibraryStore {
    pub fn open_default() -> Result<Self, Box<dyn Error>> {
        Ok(LibraryStore)
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &[]
    }
}
