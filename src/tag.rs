//! Tag names, values, and validation.
//!
//! Tag names are restricted to a small character class before they enter a
//! predicate; already-stored tags are matched verbatim and never
//! re-validated. Values are scalars compared under decoded equality, so an
//! integer and a float holding the same number compare equal while a string
//! never equals a number.

use std::borrow::Borrow;
use std::hash::Hash;

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TagTreeError};

/// Characters allowed in a tag name besides ASCII letters and digits.
const EXTRA_TAG_CHARS: [char; 3] = ['.', '-', '_'];

/// Validates a tag name before it is accepted into a predicate.
///
/// Names may contain ASCII letters, digits, and `.`, `-`, `_`. Path
/// separators and every other character are rejected with
/// [`TagTreeError::InvalidTag`].
pub fn validate_tag_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TagTreeError::InvalidTag {
            name: name.to_string(),
            reason: "name is empty",
        });
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || EXTRA_TAG_CHARS.contains(&c));
    if valid {
        Ok(())
    } else {
        Err(TagTreeError::InvalidTag {
            name: name.to_string(),
            reason: "names may only contain letters, digits and .-_",
        })
    }
}

/// A scalar value attached to a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PartialEq for TagValue {
    /// Decoded scalar equality: numbers compare numerically across the
    /// int/float split, strings compare exactly, and a string never equals
    /// a number.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => *a as f64 == *b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// The set of tags attached to one entry.
///
/// Each tag name optionally carries a scalar value. Insertion order is not
/// significant; lookups are exact-match and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSet {
    map: FnvHashMap<String, Option<TagValue>>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bare tag without a value.
    pub fn insert(&mut self, name: impl Into<String>) {
        self.map.insert(name.into(), None);
    }

    /// Adds a tag carrying a value, replacing any previous value.
    pub fn insert_value(&mut self, name: impl Into<String>, value: TagValue) {
        self.map.insert(name.into(), Some(value));
    }

    pub fn contains<Q>(&self, name: &Q) -> bool
    where
        String: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(name)
    }

    /// Returns the stored value for `name`, if the tag is present and
    /// carries one.
    pub fn value<Q>(&self, name: &Q) -> Option<&TagValue>
    where
        String: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(name).and_then(|value| value.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&TagValue>)> {
        self.map
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FromIterator<(String, Option<TagValue>)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (String, Option<TagValue>)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}
