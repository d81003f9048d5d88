//! The tree-reader capability consumed by the search engine.
//!
//! The engine never touches storage directly: it lists children, reads tag
//! sets, and reads identifiers through this trait. Two implementations ship
//! with the crate — an owned in-memory tree and a directory-backed reader
//! over the on-disk tag layout.

mod dir;
mod memory;

pub use dir::DirTree;
pub use memory::{MemoryTree, MemoryTreeBuilder};

use crate::entry::{Entry, EntryId};
use crate::error::Result;
use crate::tag::TagSet;

/// Read-only access to the entry tree.
///
/// Child order must be deterministic within one process run so traversal is
/// reproducible. A failed listing is reported, never silently skipped.
pub trait TreeReader: Send + Sync {
    /// Lists the child entries of `entry`.
    fn list_children(&self, entry: &Entry) -> Result<Vec<Entry>>;

    /// Reads the tag set of `entry` as currently stored.
    fn tags_of(&self, entry: &Entry) -> Result<TagSet>;

    /// Reads the unique identifier of `entry`.
    fn id_of(&self, entry: &Entry) -> Result<EntryId>;
}
