//! Tag predicates and their evaluation against entry snapshots.

use std::fmt;
use std::sync::Arc;

use crate::entry::Entry;
use crate::error::Result;
use crate::tag::{validate_tag_name, TagValue};

use super::text_match::fuzzy_matches;

/// A single test against an entry's tag set.
///
/// Constructors validate tag names up front, so a malformed name is
/// rejected before any traversal begins. Stored tags are matched verbatim.
#[derive(Clone)]
pub enum Predicate {
    /// The named tag is present, with or without a value.
    Exact(String),
    /// The named tag is present and its stored value equals the constraint
    /// under decoded scalar equality.
    Value(String, TagValue),
    /// Some tag name matches case-insensitively: by substring, or by
    /// shell-style wildcard when the pattern contains `*` or `?`.
    Fuzzy(String),
    /// Every name in the collection is present.
    AllOf(Vec<String>),
    /// Caller-supplied test over the whole entry.
    Custom(Arc<dyn Fn(&Entry) -> bool + Send + Sync>),
}

impl Predicate {
    /// Exact-presence predicate for one validated tag name.
    pub fn tag(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_tag_name(&name)?;
        Ok(Self::Exact(name))
    }

    /// Presence-with-value predicate for one validated tag name.
    pub fn value(name: impl Into<String>, value: impl Into<TagValue>) -> Result<Self> {
        let name = name.into();
        validate_tag_name(&name)?;
        Ok(Self::Value(name, value.into()))
    }

    /// Fuzzy predicate. The pattern admits `*` and `?` as wildcard syntax
    /// on top of the tag character class.
    pub fn fuzzy(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let stripped: String = pattern
            .chars()
            .filter(|&c| c != '*' && c != '?')
            .collect();
        if !stripped.is_empty() {
            validate_tag_name(&stripped)?;
        }
        Ok(Self::Fuzzy(pattern))
    }

    /// Conjunction of exact-presence tests over a set of validated names.
    pub fn all_of<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        for name in &names {
            validate_tag_name(name)?;
        }
        Ok(Self::AllOf(names))
    }

    /// Arbitrary caller predicate. Not validated; the closure sees the
    /// whole entry snapshot.
    pub fn custom(test: impl Fn(&Entry) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(test))
    }

    /// Evaluates this predicate against one entry.
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Self::Exact(name) => entry.tags().contains(name.as_str()),
            Self::Value(name, want) => entry
                .tags()
                .value(name.as_str())
                .map_or(false, |have| have == want),
            Self::Fuzzy(pattern) => entry.tags().names().any(|name| fuzzy_matches(pattern, name)),
            Self::AllOf(names) => names
                .iter()
                .all(|name| entry.tags().contains(name.as_str())),
            Self::Custom(test) => test(entry),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => f.debug_tuple("Exact").field(name).finish(),
            Self::Value(name, value) => f.debug_tuple("Value").field(name).field(value).finish(),
            Self::Fuzzy(pattern) => f.debug_tuple("Fuzzy").field(pattern).finish(),
            Self::AllOf(names) => f.debug_tuple("AllOf").field(names).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use crate::entry::EntryId;
    use crate::error::TagTreeError;
    use crate::tag::TagSet;

    fn entry_with(tags: &[(&str, Option<TagValue>)]) -> Entry {
        let mut set = TagSet::new();
        for (name, value) in tags {
            match value {
                Some(value) => set.insert_value(*name, value.clone()),
                None => set.insert(*name),
            }
        }
        Entry::new(EntryId::generate(), PathBuf::from("root/x"), set, None)
    }

    #[test]
    fn exact_requires_presence_only() {
        let entry = entry_with(&[("color", Some(TagValue::from("blue")))]);
        assert!(Predicate::tag("color").unwrap().matches(&entry));
        assert!(!Predicate::tag("colour").unwrap().matches(&entry));
    }

    #[test]
    fn value_requires_equal_stored_value() {
        let entry = entry_with(&[
            ("frames", Some(TagValue::Int(24))),
            ("approved", None),
        ]);
        assert!(Predicate::value("frames", 24i64).unwrap().matches(&entry));
        // Decoded equality crosses the int/float split.
        assert!(Predicate::value("frames", 24.0).unwrap().matches(&entry));
        assert!(!Predicate::value("frames", 25i64).unwrap().matches(&entry));
        // A bare tag has no value to compare.
        assert!(!Predicate::value("approved", true).unwrap().matches(&entry));
    }

    #[test]
    fn fuzzy_matches_substring_and_wildcards() {
        let entry = entry_with(&[("background-color", None)]);
        assert!(Predicate::fuzzy("COLOR").unwrap().matches(&entry));
        assert!(Predicate::fuzzy("back*color").unwrap().matches(&entry));
        assert!(!Predicate::fuzzy("back?color").unwrap().matches(&entry));
        assert!(!Predicate::fuzzy("texture").unwrap().matches(&entry));
    }

    #[test]
    fn all_of_is_a_conjunction() {
        let entry = entry_with(&[("asset", None), ("approved", None)]);
        assert!(Predicate::all_of(["asset", "approved"])
            .unwrap()
            .matches(&entry));
        assert!(!Predicate::all_of(["asset", "missing"])
            .unwrap()
            .matches(&entry));
    }

    #[test]
    fn custom_sees_the_whole_entry() {
        let entry = entry_with(&[]);
        let named_x = Predicate::custom(|entry: &Entry| entry.name() == "x");
        assert!(named_x.matches(&entry));
    }

    #[test]
    fn zero_tag_entries_match_nothing_but_custom() {
        let entry = entry_with(&[]);
        assert!(!Predicate::tag("anything").unwrap().matches(&entry));
        assert!(!Predicate::fuzzy("").unwrap().matches(&entry));
        assert!(Predicate::all_of(Vec::<String>::new()).unwrap().matches(&entry));
    }

    #[test]
    fn invalid_names_are_rejected_before_traversal() {
        assert!(matches!(
            Predicate::tag("a/b"),
            Err(TagTreeError::InvalidTag { .. })
        ));
        assert!(matches!(
            Predicate::value("a b", 1i64),
            Err(TagTreeError::InvalidTag { .. })
        ));
        assert!(matches!(
            Predicate::all_of(["ok", "not ok"]),
            Err(TagTreeError::InvalidTag { .. })
        ));
        // Wildcards are fuzzy syntax, but separators still are not.
        assert!(Predicate::fuzzy("sh_*").is_ok());
        assert!(matches!(
            Predicate::fuzzy("a/*"),
            Err(TagTreeError::InvalidTag { .. })
        ));
    }
}
