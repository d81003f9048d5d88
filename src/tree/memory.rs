//! In-memory tree reader.
//!
//! Nodes are owned top-down by the tree in a flat id-keyed map; parent and
//! child links are ids, so there is nothing for a reference cycle to hold
//! alive. Snapshots handed to the engine are built on demand.

use std::path::PathBuf;

use fnv::FnvHashMap;

use crate::entry::{Entry, EntryId};
use crate::error::Result;
use crate::tag::{TagSet, TagValue};
use crate::tree::TreeReader;

struct Node {
    location: PathBuf,
    tags: TagSet,
    parent: Option<EntryId>,
    children: Vec<EntryId>,
}

/// An owned, fully materialized entry tree.
///
/// Assembled with [`MemoryTreeBuilder`]; immutable afterwards. Child order
/// is insertion order, which keeps traversal deterministic.
pub struct MemoryTree {
    nodes: FnvHashMap<EntryId, Node>,
    root: EntryId,
}

impl MemoryTree {
    /// Starts building a tree whose root entry has the given name.
    pub fn builder(root_name: &str) -> MemoryTreeBuilder {
        MemoryTreeBuilder::new(root_name)
    }

    /// Snapshot of the root entry.
    pub fn root(&self) -> Entry {
        self.snapshot(self.root)
            .expect("root node always present")
    }

    /// Snapshot of an arbitrary entry by id.
    pub fn entry(&self, id: EntryId) -> Option<Entry> {
        self.snapshot(id)
    }

    fn snapshot(&self, id: EntryId) -> Option<Entry> {
        let node = self.nodes.get(&id)?;
        Some(Entry::new(
            id,
            node.location.clone(),
            node.tags.clone(),
            node.parent,
        ))
    }
}

impl TreeReader for MemoryTree {
    fn list_children(&self, entry: &Entry) -> Result<Vec<Entry>> {
        let children = match self.nodes.get(&entry.id()) {
            Some(node) => &node.children,
            None => return Ok(Vec::new()),
        };
        Ok(children
            .iter()
            .filter_map(|id| self.snapshot(*id))
            .collect())
    }

    fn tags_of(&self, entry: &Entry) -> Result<TagSet> {
        Ok(self
            .nodes
            .get(&entry.id())
            .map(|node| node.tags.clone())
            .unwrap_or_default())
    }

    fn id_of(&self, entry: &Entry) -> Result<EntryId> {
        Ok(entry.id())
    }
}

/// Builder for [`MemoryTree`].
///
/// Stored tag names are taken verbatim; validation belongs to predicate
/// construction, not to the store.
pub struct MemoryTreeBuilder {
    nodes: FnvHashMap<EntryId, Node>,
    root: EntryId,
}

impl MemoryTreeBuilder {
    pub fn new(root_name: &str) -> Self {
        let root = EntryId::generate();
        let mut nodes = FnvHashMap::default();
        nodes.insert(
            root,
            Node {
                location: PathBuf::from(root_name),
                tags: TagSet::new(),
                parent: None,
                children: Vec::new(),
            },
        );
        Self { nodes, root }
    }

    pub fn root_id(&self) -> EntryId {
        self.root
    }

    /// Adds a child entry under `parent` and returns its id.
    ///
    /// # Panics
    /// Panics if `parent` is not part of the tree being built.
    pub fn add_child(&mut self, parent: EntryId, name: &str) -> EntryId {
        let id = EntryId::generate();
        let location = {
            let parent_node = self
                .nodes
                .get_mut(&parent)
                .expect("parent must exist before its children");
            parent_node.children.push(id);
            parent_node.location.join(name)
        };
        self.nodes.insert(
            id,
            Node {
                location,
                tags: TagSet::new(),
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        id
    }

    /// Attaches a bare tag to an entry.
    pub fn tag(&mut self, id: EntryId, name: &str) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.tags.insert(name);
        }
        self
    }

    /// Attaches a tag with a value to an entry.
    pub fn tag_value(&mut self, id: EntryId, name: &str, value: impl Into<TagValue>) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.tags.insert_value(name, value.into());
        }
        self
    }

    pub fn finish(self) -> MemoryTree {
        MemoryTree {
            nodes: self.nodes,
            root: self.root,
        }
    }
}
