use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::{
    convert::Infallible,
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
    str::FromStr,
};
use uuid::Uuid;

/// Unique identifier of a library entry
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A single game or application in the library
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub id: EntryId,
    /// Display name
    #[serde(default)]
    pub title: String,
    /// Filesystem path, or a protocol reference when `is_protocol_reference` is set
    #[serde(default)]
    pub executable_path: String,
    /// Extracted cover image, empty when there is none
    #[serde(default)]
    pub cover_image_path: PathBuf,
    #[serde(default)]
    pub is_protocol_reference: bool,
    pub tags: Option<Vec<String>>,
    pub install_size_bytes: Option<u64>,
}

impl LibraryEntry {
    /// Create an entry with a fresh id and no cover
    pub fn new(
        title: impl Into<String>,
        executable_path: impl Into<String>,
        is_protocol_reference: bool,
    ) -> Self {
        Self {
            id: EntryId::new(),
            title: title.into(),
            executable_path: executable_path.into(),
            cover_image_path: PathBuf::new(),
            is_protocol_reference,
            tags: None,
            install_size_bytes: None,
        }
    }

    /// The cover image path, if one is set
    pub fn cover_image(&self) -> Option<&Path> {
        (!self.cover_image_path.as_os_str().is_empty())
            .then_some(self.cover_image_path.as_path())
    }

    /// Human readable launch kind
    pub fn kind(&self) -> &'static str {
        if self.is_protocol_reference {
            "protocol"
        } else {
            "executable"
        }
    }
}

/// The way a user names an entry on the command line:
/// a full id, a unique id prefix or a title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySelector(String);

impl EntrySelector {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the selector names the given entry
    pub fn matches_id(&self, entry: &LibraryEntry) -> bool {
        let needle = self.0.to_ascii_lowercase();
        !needle.is_empty() && entry.id.to_string().starts_with(&needle)
    }

    pub fn matches_title(&self, entry: &LibraryEntry) -> bool {
        entry.title.to_lowercase() == self.0.trim().to_lowercase()
    }
}

impl FromStr for EntrySelector {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl Display for EntrySelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
