//! Partial-identifier resolution over the walker.
//!
//! A fragment is a prefix of an entry id's canonical text. Resolution is a
//! single lazy pass: it keeps walking after the first hit to look for a
//! second one, and stops as soon as ambiguity is proven.

use std::sync::Arc;

use crate::entry::Entry;
use crate::error::{Result, TagTreeError};
use crate::query::Predicate;
use crate::search::cursor::Search;
use crate::tree::TreeReader;

/// Lazy sequence of entries whose id starts with `fragment`. An empty
/// fragment matches every entry.
pub fn resolve_all(reader: Arc<dyn TreeReader>, root: Entry, fragment: &str) -> Search {
    let fragment = fragment.to_string();
    Search::new(
        reader,
        root,
        Some(Predicate::custom(move |entry: &Entry| {
            entry.id().matches_fragment(&fragment)
        })),
        None,
    )
}

/// Resolves `fragment` to exactly one entry.
///
/// Fails with [`TagTreeError::NotFound`] when nothing matches and with
/// [`TagTreeError::AmbiguousIdentifier`] as soon as a second match is
/// found — the rest of the tree is not visited.
pub fn resolve_one(reader: Arc<dyn TreeReader>, root: Entry, fragment: &str) -> Result<Entry> {
    let mut matches = resolve_all(reader, root, fragment);
    let first = match matches.next()? {
        Some(entry) => entry,
        None => return Err(TagTreeError::NotFound),
    };
    match matches.next()? {
        Some(_) => Err(TagTreeError::AmbiguousIdentifier {
            fragment: fragment.to_string(),
        }),
        None => Ok(first),
    }
}
