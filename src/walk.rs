//! Lazy, depth-bounded, pre-order traversal over a tree reader.
//!
//! The walk's position is plain data: a stack of listed sibling sets plus
//! the index of the next candidate in each, with pending listings recorded
//! as frames that have not performed their I/O yet. No live handle is held
//! between steps, so a walk can be cloned mid-flight and both halves
//! advanced independently.

use std::sync::Arc;

use crate::entry::{Entry, EntryId};
use crate::error::Result;
use crate::tree::TreeReader;

/// One level of the traversal.
#[derive(Clone)]
enum Frame {
    /// A node whose children have not been listed yet. The listing happens
    /// when the walk advances past the node, not when the node is yielded.
    Unlisted { parent: Entry, depth: usize },
    /// A sibling set produced by one listing call, partially consumed.
    Listed {
        entries: Vec<Entry>,
        next: usize,
        depth: usize,
    },
}

impl Frame {
    fn depth(&self) -> usize {
        match self {
            Self::Unlisted { depth, .. } | Self::Listed { depth, .. } => *depth,
        }
    }
}

/// Depth-first pre-order walk of the entry tree.
///
/// The root is a candidate at depth 0. Children are enumerated through the
/// tree reader only as the walk advances, so peak memory is bounded by the
/// sibling sets along the current path. A read failure aborts the walk and
/// is reported tagged with the offending entry; the walk is not resumable
/// afterwards.
#[derive(Clone)]
pub struct TreeWalk {
    reader: Arc<dyn TreeReader>,
    stack: Vec<Frame>,
    max_depth: Option<usize>,
    last_yielded: Option<EntryId>,
    done: bool,
}

impl TreeWalk {
    /// Starts a walk at `root`. `max_depth` bounds how many hops below the
    /// root are visited; `None` is unbounded, `Some(0)` yields the root
    /// only.
    pub fn new(reader: Arc<dyn TreeReader>, root: Entry, max_depth: Option<usize>) -> Self {
        Self {
            reader,
            stack: vec![Frame::Listed {
                entries: vec![root],
                next: 0,
                depth: 0,
            }],
            max_depth,
            last_yielded: None,
            done: false,
        }
    }

    /// Advances to the next entry in pre-order.
    ///
    /// Returns `Ok(None)` once the walk is exhausted. A read failure aborts
    /// the walk; every later call returns `Ok(None)`.
    pub fn advance(&mut self) -> Result<Option<Entry>> {
        if self.done {
            return Ok(None);
        }
        loop {
            let Some(frame) = self.stack.last_mut() else {
                self.done = true;
                return Ok(None);
            };
            match frame {
                Frame::Unlisted { parent, depth } => {
                    let parent = parent.clone();
                    let depth = *depth;
                    self.stack.pop();
                    let children = match self.reader.list_children(&parent) {
                        Ok(children) => children,
                        Err(err) => {
                            log::debug!("walk aborted at {parent}: {err}");
                            self.release();
                            return Err(err);
                        }
                    };
                    if !children.is_empty() {
                        self.stack.push(Frame::Listed {
                            entries: children,
                            next: 0,
                            depth,
                        });
                    }
                }
                Frame::Listed {
                    entries,
                    next,
                    depth,
                } => {
                    if *next >= entries.len() {
                        self.stack.pop();
                        continue;
                    }
                    let entry = entries[*next].clone();
                    *next += 1;
                    let depth = *depth;
                    if self.may_descend(depth) {
                        self.stack.push(Frame::Unlisted {
                            parent: entry.clone(),
                            depth: depth + 1,
                        });
                    }
                    self.last_yielded = Some(entry.id());
                    return Ok(Some(entry));
                }
            }
        }
    }

    fn may_descend(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |limit| depth < limit)
    }

    /// Skips descent into the most recently yielded entry. A no-op if that
    /// entry's subtree was already entered or ruled out by the depth bound.
    pub fn prune(&mut self) {
        if let Some(Frame::Unlisted { parent, .. }) = self.stack.last() {
            if self.last_yielded == Some(parent.id()) {
                self.stack.pop();
            }
        }
    }

    /// Tightens the depth bound for the rest of the walk. Only ever
    /// narrows; a looser limit than the current one is ignored.
    pub fn limit_depth(&mut self, limit: usize) {
        let limit = match self.max_depth {
            Some(current) => current.min(limit),
            None => limit,
        };
        self.max_depth = Some(limit);
        // Frames deeper than the new bound sit on top of the stack; depths
        // are strictly increasing toward the top.
        self.stack.retain(|frame| frame.depth() <= limit);
    }

    /// Abandons the current position and restarts at `root`, which becomes
    /// depth 0 under the current depth bound.
    pub fn redirect(&mut self, root: Entry) {
        log::debug!("walk redirected to {root}");
        self.stack = vec![Frame::Listed {
            entries: vec![root],
            next: 0,
            depth: 0,
        }];
        self.last_yielded = None;
        self.done = false;
    }

    /// Drops all traversal state. The walk reports exhaustion afterwards.
    pub fn release(&mut self) {
        self.stack.clear();
        self.last_yielded = None;
        self.done = true;
    }

    pub fn is_exhausted(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::TagTreeError;
    use crate::tree::MemoryTree;

    /// root -> a(a1, a2), b(b1(b1x)), c
    fn sample_tree() -> (Arc<MemoryTree>, EntryId) {
        let mut builder = MemoryTree::builder("root");
        let root = builder.root_id();
        let a = builder.add_child(root, "a");
        builder.add_child(a, "a1");
        builder.add_child(a, "a2");
        let b = builder.add_child(root, "b");
        let b1 = builder.add_child(b, "b1");
        builder.add_child(b1, "b1x");
        builder.add_child(root, "c");
        (Arc::new(builder.finish()), b)
    }

    fn drain_names(walk: &mut TreeWalk) -> Vec<String> {
        let mut names = Vec::new();
        while let Some(entry) = walk.advance().unwrap() {
            names.push(entry.name().to_string());
        }
        names
    }

    #[test]
    fn preorder_yields_each_entry_exactly_once() {
        let (tree, _) = sample_tree();
        let root = tree.root();
        let mut walk = TreeWalk::new(tree, root, None);
        assert_eq!(
            drain_names(&mut walk),
            ["root", "a", "a1", "a2", "b", "b1", "b1x", "c"]
        );
        // Restartable only via a fresh walk.
        assert!(walk.is_exhausted());
        assert!(walk.advance().unwrap().is_none());
    }

    #[test]
    fn depth_zero_yields_root_only() {
        let (tree, _) = sample_tree();
        let root = tree.root();
        let mut walk = TreeWalk::new(tree, root, Some(0));
        assert_eq!(drain_names(&mut walk), ["root"]);
    }

    #[test]
    fn depth_bound_limits_hops_from_root() {
        let (tree, _) = sample_tree();
        let root = tree.root();
        let mut walk = TreeWalk::new(tree.clone(), root.clone(), Some(1));
        assert_eq!(drain_names(&mut walk), ["root", "a", "b", "c"]);

        let mut walk = TreeWalk::new(tree, root, Some(2));
        assert_eq!(
            drain_names(&mut walk),
            ["root", "a", "a1", "a2", "b", "b1", "c"]
        );
    }

    #[test]
    fn listings_happen_only_as_the_walk_advances() {
        struct CountingReader {
            inner: Arc<MemoryTree>,
            listings: AtomicUsize,
        }

        impl TreeReader for CountingReader {
            fn list_children(&self, entry: &Entry) -> Result<Vec<Entry>> {
                self.listings.fetch_add(1, Ordering::Relaxed);
                self.inner.list_children(entry)
            }
            fn tags_of(&self, entry: &Entry) -> Result<crate::tag::TagSet> {
                self.inner.tags_of(entry)
            }
            fn id_of(&self, entry: &Entry) -> Result<EntryId> {
                self.inner.id_of(entry)
            }
        }

        let (tree, _) = sample_tree();
        let root = tree.root();
        let reader = Arc::new(CountingReader {
            inner: tree,
            listings: AtomicUsize::new(0),
        });
        let mut walk = TreeWalk::new(reader.clone(), root, None);

        // Creating the walk performs no I/O, and neither does yielding the
        // root itself.
        assert_eq!(reader.listings.load(Ordering::Relaxed), 0);
        walk.advance().unwrap();
        assert_eq!(reader.listings.load(Ordering::Relaxed), 0);

        // The root listing happens on the pull that moves past it.
        walk.advance().unwrap();
        assert_eq!(reader.listings.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn read_error_aborts_tagged_with_offending_entry() {
        struct FailingReader {
            inner: Arc<MemoryTree>,
            fail_at: String,
        }

        impl TreeReader for FailingReader {
            fn list_children(&self, entry: &Entry) -> Result<Vec<Entry>> {
                if entry.name() == self.fail_at {
                    return Err(TagTreeError::read_at(
                        entry.location().display().to_string(),
                        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                    ));
                }
                self.inner.list_children(entry)
            }
            fn tags_of(&self, entry: &Entry) -> Result<crate::tag::TagSet> {
                self.inner.tags_of(entry)
            }
            fn id_of(&self, entry: &Entry) -> Result<EntryId> {
                self.inner.id_of(entry)
            }
        }

        let (tree, _) = sample_tree();
        let root = tree.root();
        let reader = Arc::new(FailingReader {
            inner: tree,
            fail_at: "b".to_string(),
        });
        let mut walk = TreeWalk::new(reader, root, None);

        let mut yielded = Vec::new();
        let err = loop {
            match walk.advance() {
                Ok(Some(entry)) => yielded.push(entry.name().to_string()),
                Ok(None) => panic!("walk finished without surfacing the failure"),
                Err(err) => break err,
            }
        };
        assert_eq!(yielded, ["root", "a", "a1", "a2", "b"]);
        match err {
            TagTreeError::Read { entry, .. } => assert!(entry.ends_with("b"), "tagged {entry}"),
            other => panic!("unexpected error {other}"),
        }
        // Aborted, not resumable.
        assert!(walk.advance().unwrap().is_none());
    }

    #[test]
    fn clone_resumes_at_the_same_position() {
        let (tree, _) = sample_tree();
        let root = tree.root();
        let mut walk = TreeWalk::new(tree, root, None);
        walk.advance().unwrap();
        walk.advance().unwrap();

        let mut forked = walk.clone();
        let rest_original = drain_names(&mut walk);
        let rest_forked = drain_names(&mut forked);
        assert_eq!(rest_original, ["a1", "a2", "b", "b1", "b1x", "c"]);
        assert_eq!(rest_original, rest_forked);
    }

    #[test]
    fn prune_skips_the_current_subtree() {
        let (tree, _) = sample_tree();
        let root = tree.root();
        let mut walk = TreeWalk::new(tree, root, None);
        // Advance to "b", then refuse its subtree.
        for _ in 0..5 {
            walk.advance().unwrap();
        }
        walk.prune();
        assert_eq!(drain_names(&mut walk), ["c"]);
    }

    #[test]
    fn limit_depth_narrows_midflight() {
        let (tree, _) = sample_tree();
        let root = tree.root();
        let mut walk = TreeWalk::new(tree, root, None);
        walk.advance().unwrap(); // root
        walk.limit_depth(1);
        assert_eq!(drain_names(&mut walk), ["a", "b", "c"]);
    }

    #[test]
    fn redirect_restarts_from_another_subtree() {
        let (tree, b) = sample_tree();
        let root = tree.root();
        let subtree = tree.entry(b).unwrap();
        let mut walk = TreeWalk::new(tree, root, None);
        walk.advance().unwrap(); // root
        walk.redirect(subtree);
        assert_eq!(drain_names(&mut walk), ["b", "b1", "b1x"]);
    }
}
