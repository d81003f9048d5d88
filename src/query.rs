//! Predicate construction and matching for tag search.
//!
//! A predicate is one test against an entry's tag set; a cursor carries an
//! ordered chain of them with AND semantics. There is no OR at this layer —
//! callers combine separate searches for that.

mod predicate;
mod text_match;

pub use predicate::Predicate;
