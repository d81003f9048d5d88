//! The resumable, cancelable search cursor.
//!
//! Reframes the lazy traversal as an explicit state machine: a cursor is
//! `open` (suspended between matches when observed from outside a pull) or
//! `closed`. All I/O happens synchronously inside `next`/`send`/`one`; the
//! cursor performs no background work and cancellation is cooperative via
//! `close` or `throw`, observed at pull boundaries.

use std::sync::Arc;

use crate::entry::{Entry, EntryId};
use crate::error::{Result, TagTreeError};
use crate::query::Predicate;
use crate::tag::TagSet;
use crate::tree::TreeReader;
use crate::walk::TreeWalk;

/// Control signals a caller can feed into a suspended traversal with
/// [`Search::send`].
#[derive(Debug, Clone)]
pub enum Signal {
    /// Tighten the remaining depth bound.
    LimitDepth(usize),
    /// Do not descend into the most recently yielded match.
    PruneSubtree,
    /// Abandon the current position and continue from this subtree.
    Redirect(Entry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    /// Live: mid-pull, or suspended between matches.
    Open,
    /// Terminal: released by `close`/`throw` or by natural exhaustion.
    Closed,
}

/// A stateful, resumable, cancelable query over the entry tree.
///
/// Owns the walker position and an ordered predicate chain with AND
/// semantics. Not safe for concurrent use from multiple threads; fork with
/// [`Search::clone`] to hand independent query state to another thread.
pub struct Search {
    walk: TreeWalk,
    predicates: Vec<Predicate>,
    state: CursorState,
    /// Most recently yielded match; target of the accessor operations and
    /// the anchor of the suspension point.
    current: Option<Entry>,
}

impl Search {
    pub(crate) fn new(
        reader: Arc<dyn TreeReader>,
        root: Entry,
        predicate: Option<Predicate>,
        max_depth: Option<usize>,
    ) -> Self {
        Self {
            walk: TreeWalk::new(reader, root, max_depth),
            predicates: predicate.into_iter().collect(),
            state: CursorState::Open,
            current: None,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            CursorState::Open => Ok(()),
            CursorState::Closed => Err(TagTreeError::CursorClosed),
        }
    }

    fn release(&mut self) {
        self.walk.release();
        self.current = None;
        self.state = CursorState::Closed;
    }

    /// Appends a predicate to the chain and returns the same logical
    /// cursor. Takes effect on the next advance; entries already yielded
    /// are not revisited.
    pub fn filter(&mut self, predicate: Predicate) -> Result<&mut Self> {
        self.ensure_open()?;
        self.predicates.push(predicate);
        Ok(self)
    }

    /// Advances the walker until a candidate satisfies the whole predicate
    /// chain.
    ///
    /// Returns `Ok(None)` exactly once on natural exhaustion, which closes
    /// the cursor; afterwards every operation fails with
    /// [`TagTreeError::CursorClosed`]. A read failure aborts the traversal
    /// and closes the cursor too.
    pub fn next(&mut self) -> Result<Option<Entry>> {
        self.ensure_open()?;
        loop {
            match self.walk.advance() {
                Ok(Some(candidate)) => {
                    if self.predicates.iter().all(|p| p.matches(&candidate)) {
                        self.current = Some(candidate.clone());
                        return Ok(Some(candidate));
                    }
                }
                Ok(None) => {
                    self.release();
                    return Ok(None);
                }
                Err(err) => {
                    self.release();
                    return Err(err);
                }
            }
        }
    }

    /// Feeds a control signal into the suspended traversal, then advances
    /// like [`Search::next`].
    ///
    /// If the cursor has not suspended yet (nothing has been yielded), the
    /// signal has no position to act on and `send` is equivalent to
    /// `next`.
    pub fn send(&mut self, signal: Signal) -> Result<Option<Entry>> {
        self.ensure_open()?;
        if self.current.is_some() {
            match signal {
                Signal::LimitDepth(limit) => self.walk.limit_depth(limit),
                Signal::PruneSubtree => self.walk.prune(),
                Signal::Redirect(root) => self.walk.redirect(root),
            }
        }
        self.next()
    }

    /// Injects `error` at the current suspension point: runs the same
    /// cleanup as [`Search::close`], then re-raises the error to the
    /// caller. Nothing inside the traversal catches it.
    pub fn throw(&mut self, error: TagTreeError) -> Result<Option<Entry>> {
        self.ensure_open()?;
        self.release();
        Err(error)
    }

    /// Releases the walker state and closes the cursor. Idempotent; every
    /// operation after the first `close` fails with
    /// [`TagTreeError::CursorClosed`] except `close` itself.
    pub fn close(&mut self) {
        if self.state == CursorState::Closed {
            return;
        }
        log::trace!("search cursor closed");
        self.release();
    }

    /// Drains at most two elements to decide: the single remaining match,
    /// [`TagTreeError::NotFound`] if none remain, or
    /// [`TagTreeError::AmbiguousResult`] if more than one does.
    pub fn one(&mut self) -> Result<Entry> {
        let first = match self.next()? {
            Some(entry) => entry,
            None => return Err(TagTreeError::NotFound),
        };
        match self.next()? {
            Some(_) => Err(TagTreeError::AmbiguousResult),
            None => Ok(first),
        }
    }

    /// The most recently yielded match. `None` before the first match and
    /// after close.
    pub fn current(&self) -> Option<&Entry> {
        self.current.as_ref()
    }

    /// Tag set of the current match. No traversal side effects.
    pub fn tags(&self) -> Option<&TagSet> {
        self.current.as_ref().map(Entry::tags)
    }

    /// Identifier of the current match. No traversal side effects.
    pub fn uuid(&self) -> Option<EntryId> {
        self.current.as_ref().map(Entry::id)
    }

    /// Display name of the current match. No traversal side effects.
    pub fn name(&self) -> Option<&str> {
        self.current.as_ref().map(Entry::name)
    }

    pub fn is_closed(&self) -> bool {
        self.state == CursorState::Closed
    }
}

impl Clone for Search {
    /// Forks an independent cursor with the same root, predicate chain,
    /// and traversal position. Entries already yielded here are not
    /// re-yielded by the fork, and the fork performs its own listings from
    /// the shared reader — no live traversal state is shared afterwards.
    fn clone(&self) -> Self {
        Self {
            walk: self.walk.clone(),
            predicates: self.predicates.clone(),
            state: self.state,
            current: self.current.clone(),
        }
    }
}

/// Iterator adaptation of the strict cursor protocol: exhaustion and the
/// closed state both surface as `None` rather than `CursorClosed`, so a
/// cursor can be consumed by a `for` loop or collected.
impl Iterator for Search {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_closed() {
            return None;
        }
        Search::next(self).transpose()
    }
}
