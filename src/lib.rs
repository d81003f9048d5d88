//! Tag-indexed entry store over a hierarchical namespace.
//!
//! Every stored object ("entry") is a node in a tree, identified by a
//! unique id and annotated with named tags that optionally carry scalar
//! values. Client code locates entries not by path but by tag predicates,
//! evaluated lazily over the tree:
//!
//! - [`search()`] / [`search_tree()`] return a [`Search`] cursor — a
//!   stateful, resumable, cancelable query supporting `next`, `send`,
//!   `throw`, `close`, `clone`, `one`, and `filter`;
//! - [`search_uuid()`] / [`one_uuid()`] resolve full or partial
//!   identifiers;
//! - [`select_from_tree()`] exposes the raw depth-bounded walk.
//!
//! Storage is behind the [`TreeReader`] capability; [`MemoryTree`] and
//! [`DirTree`] are the bundled implementations.

pub mod entry;
pub mod error;
pub mod query;
pub mod search;
pub mod tag;
pub mod tree;
pub mod walk;

// Re-export main types
pub use entry::{Entry, EntryId};
pub use error::{Result, TagTreeError};
pub use query::Predicate;
pub use search::{
    one_uuid, resolve_all, resolve_one, search, search_tree, search_uuid, select_from_tree, Search,
    Signal,
};
pub use tag::{validate_tag_name, TagSet, TagValue};
pub use tree::{DirTree, MemoryTree, MemoryTreeBuilder, TreeReader};
pub use walk::TreeWalk;
