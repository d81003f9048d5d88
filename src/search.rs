//! Tag search over the entry tree.
//!
//! This module is the query surface: cursor construction plus
//! partial-identifier resolution. All functions take the tree-reader
//! capability and a root entry; traversal starts lazily on the first pull.

mod cursor;
mod resolve;

pub use cursor::{Search, Signal};
pub use resolve::{resolve_all, resolve_one};

use std::sync::Arc;

use crate::entry::Entry;
use crate::error::Result;
use crate::query::Predicate;
use crate::tree::TreeReader;

/// Starts an unbounded-depth search from `root`. The predicate chain
/// starts with zero or one entries; extend it with [`Search::filter`].
pub fn search(reader: Arc<dyn TreeReader>, root: Entry, predicate: Option<Predicate>) -> Search {
    Search::new(reader, root, predicate, None)
}

/// Starts a depth-bounded search from `root`. `max_depth` counts hops
/// below the root; `None` is unbounded and `Some(0)` considers the root
/// only.
pub fn search_tree(
    reader: Arc<dyn TreeReader>,
    root: Entry,
    predicate: Option<Predicate>,
    max_depth: Option<usize>,
) -> Search {
    Search::new(reader, root, predicate, max_depth)
}

/// Lazy sequence of entries whose id starts with `fragment`.
pub fn search_uuid(reader: Arc<dyn TreeReader>, root: Entry, fragment: &str) -> Search {
    resolve_all(reader, root, fragment)
}

/// Resolves `fragment` to exactly one entry, failing on zero matches or
/// on ambiguity.
pub fn one_uuid(reader: Arc<dyn TreeReader>, root: Entry, fragment: &str) -> Result<Entry> {
    resolve_one(reader, root, fragment)
}

/// Unfiltered depth-bounded walk, for callers that want raw traversal.
pub fn select_from_tree(
    reader: Arc<dyn TreeReader>,
    root: Entry,
    max_depth: Option<usize>,
) -> Search {
    Search::new(reader, root, None, max_depth)
}
