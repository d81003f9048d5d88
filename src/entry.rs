//! Entry identity and snapshot values.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tag::TagSet;

/// Globally unique identifier of an entry.
///
/// Generated once when the entry is created and immutable for its lifetime.
/// The canonical hyphenated text form is what partial-identifier resolution
/// matches prefixes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses the canonical hyphenated text form.
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::parse_str(text).ok().map(Self)
    }

    /// Canonical hyphenated lowercase text.
    pub fn canonical(&self) -> String {
        self.0.to_string()
    }

    /// Whether the canonical text starts with `fragment`.
    pub fn matches_fragment(&self, fragment: &str) -> bool {
        // Uuid::to_string is hyphenated lowercase; normalize the fragment
        // the same way so resolution is case-insensitive like uuids are.
        self.canonical().starts_with(&fragment.to_ascii_lowercase())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A snapshot of one node in the tree, produced by a tree reader.
///
/// Entries are plain values: the engine never mutates them, and cloning one
/// copies the id, location, and tag set it carried when it was listed. The
/// parent link is an id only, never an owning reference, so snapshots cannot
/// form ownership cycles.
#[derive(Debug, Clone)]
pub struct Entry {
    id: EntryId,
    name: String,
    location: PathBuf,
    tags: TagSet,
    parent: Option<EntryId>,
}

impl Entry {
    /// Builds a snapshot. The display name is the last segment of
    /// `location`.
    pub fn new(id: EntryId, location: PathBuf, tags: TagSet, parent: Option<EntryId>) -> Self {
        let name = location
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| location.to_string_lossy().into_owned());
        Self {
            id,
            name,
            location,
            tags,
            parent,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Display name: the last segment of the location.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position in the hierarchical namespace. Used only to enumerate
    /// children; the matcher never interprets it.
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Id of the parent entry; `None` for the root.
    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.location.display().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_last_location_segment() {
        let entry = Entry::new(
            EntryId::generate(),
            PathBuf::from("/projects/alpha/shot_010"),
            TagSet::new(),
            None,
        );
        assert_eq!(entry.name(), "shot_010");
    }

    #[test]
    fn fragment_matching_is_prefix_based() {
        let id = EntryId::parse("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap();
        assert!(id.matches_fragment(""));
        assert!(id.matches_fragment("6ba7"));
        assert!(id.matches_fragment("6BA7B810"));
        assert!(!id.matches_fragment("7ba7"));
    }
}
