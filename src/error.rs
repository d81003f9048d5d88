use std::io;

#[derive(Debug, thiserror::Error)]
pub enum TagTreeError {
    #[error("Invalid tag name {name:?}: {reason}")]
    InvalidTag { name: String, reason: &'static str },

    #[error("Read error at {entry}: {source}")]
    Read {
        entry: String,
        #[source]
        source: io::Error,
    },

    #[error("Data error at {entry}: {reason}")]
    Data { entry: String, reason: String },

    #[error("No matching entry")]
    NotFound,

    #[error("Ambiguous result: more than one entry matched")]
    AmbiguousResult,

    #[error("Ambiguous identifier: {fragment:?} matches more than one entry")]
    AmbiguousIdentifier { fragment: String },

    #[error("Cursor is closed")]
    CursorClosed,
}

impl TagTreeError {
    /// Builds a `Read` error tagged with the entry (or location) that failed.
    pub(crate) fn read_at(entry: impl Into<String>, source: io::Error) -> Self {
        Self::Read {
            entry: entry.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TagTreeError>;
