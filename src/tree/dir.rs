//! Directory-backed tree reader over the on-disk tag layout.
//!
//! A directory maps to an entry. Its stored state lives in a data directory
//! (default `.data`) next to its children:
//!
//! - `tag_<name>` marker files carry the tags; an empty body is a bare tag,
//!   a JSON scalar body is the tag's value;
//! - a `uuid_<id>` marker file carries the entry's identifier.
//!
//! Directories without stored state are still entries — they have no tags
//! and receive a generated id that stays stable for the process lifetime.
//! The reader is read-only; it never creates or repairs on-disk state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fnv::FnvHashMap;
use parking_lot::RwLock;

use crate::entry::{Entry, EntryId};
use crate::error::{Result, TagTreeError};
use crate::tag::{TagSet, TagValue};
use crate::tree::TreeReader;

const TAG_PREFIX: &str = "tag_";
const UUID_PREFIX: &str = "uuid_";
const DEFAULT_DATA_DIR: &str = ".data";

/// Tree reader rooted at a directory.
#[derive(Debug)]
pub struct DirTree {
    root: PathBuf,
    data_dir: String,
    /// Process-stable ids for directories without a stored `uuid_` marker.
    generated_ids: RwLock<FnvHashMap<PathBuf, EntryId>>,
}

impl DirTree {
    /// Opens a tree rooted at an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let metadata = fs::metadata(&root)
            .map_err(|source| TagTreeError::read_at(root.display().to_string(), source))?;
        if !metadata.is_dir() {
            return Err(TagTreeError::read_at(
                root.display().to_string(),
                io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }
        log::debug!("opened entry tree at {}", root.display());
        Ok(Self {
            root,
            data_dir: DEFAULT_DATA_DIR.to_string(),
            generated_ids: RwLock::new(FnvHashMap::default()),
        })
    }

    /// Overrides the data directory name (default `.data`).
    pub fn with_data_dir(mut self, name: impl Into<String>) -> Self {
        self.data_dir = name.into();
        self
    }

    /// Snapshot of the root entry.
    pub fn root_entry(&self) -> Result<Entry> {
        self.read_entry(self.root.clone(), None)
    }

    fn data_path(&self, location: &Path) -> PathBuf {
        location.join(&self.data_dir)
    }

    fn read_entry(&self, location: PathBuf, parent: Option<EntryId>) -> Result<Entry> {
        let (tags, stored_id) = self.read_data(&location)?;
        let id = match stored_id {
            Some(id) => id,
            None => self.generated_id(&location),
        };
        Ok(Entry::new(id, location, tags, parent))
    }

    /// Scans the data directory once for tag and uuid markers.
    fn read_data(&self, location: &Path) -> Result<(TagSet, Option<EntryId>)> {
        let data = self.data_path(location);
        if !data.is_dir() {
            return Ok((TagSet::new(), None));
        }

        let at = || location.display().to_string();
        let mut tags = TagSet::new();
        let mut stored_id = None;

        for dirent in fs::read_dir(&data).map_err(|source| TagTreeError::read_at(at(), source))? {
            let dirent = dirent.map_err(|source| TagTreeError::read_at(at(), source))?;
            let file_name = dirent.file_name().to_string_lossy().into_owned();

            if let Some(tag_name) = file_name.strip_prefix(TAG_PREFIX) {
                let body = fs::read_to_string(dirent.path())
                    .map_err(|source| TagTreeError::read_at(at(), source))?;
                match decode_scalar(body.trim()) {
                    Ok(None) => tags.insert(tag_name),
                    Ok(Some(value)) => tags.insert_value(tag_name, value),
                    Err(reason) => {
                        return Err(TagTreeError::Data {
                            entry: at(),
                            reason: format!("tag {tag_name:?}: {reason}"),
                        })
                    }
                }
            } else if let Some(text) = file_name.strip_prefix(UUID_PREFIX) {
                stored_id = EntryId::parse(text);
                if stored_id.is_none() {
                    return Err(TagTreeError::Data {
                        entry: at(),
                        reason: format!("unparsable identifier marker {file_name:?}"),
                    });
                }
            }
        }

        Ok((tags, stored_id))
    }

    fn generated_id(&self, location: &Path) -> EntryId {
        if let Some(id) = self.generated_ids.read().get(location) {
            return *id;
        }
        *self
            .generated_ids
            .write()
            .entry(location.to_path_buf())
            .or_insert_with(EntryId::generate)
    }
}

impl TreeReader for DirTree {
    fn list_children(&self, entry: &Entry) -> Result<Vec<Entry>> {
        let location = entry.location();
        let at = || location.display().to_string();

        let mut names = Vec::new();
        for dirent in fs::read_dir(location).map_err(|source| TagTreeError::read_at(at(), source))?
        {
            let dirent = dirent.map_err(|source| TagTreeError::read_at(at(), source))?;
            let file_type = dirent
                .file_type()
                .map_err(|source| TagTreeError::read_at(at(), source))?;
            let name = dirent.file_name().to_string_lossy().into_owned();
            if file_type.is_dir() && name != self.data_dir {
                names.push(name);
            }
        }
        // Name order keeps traversal reproducible across runs.
        names.sort();

        names
            .into_iter()
            .map(|name| self.read_entry(location.join(name), Some(entry.id())))
            .collect()
    }

    fn tags_of(&self, entry: &Entry) -> Result<TagSet> {
        let (tags, _) = self.read_data(entry.location())?;
        Ok(tags)
    }

    fn id_of(&self, entry: &Entry) -> Result<EntryId> {
        let (_, stored_id) = self.read_data(entry.location())?;
        Ok(stored_id.unwrap_or_else(|| self.generated_id(entry.location())))
    }
}

/// Decodes a tag file body. Empty or `null` bodies are bare tags; any JSON
/// scalar is a value; everything else is rejected.
fn decode_scalar(body: &str) -> std::result::Result<Option<TagValue>, String> {
    if body.is_empty() {
        return Ok(None);
    }
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|err| format!("value is not valid JSON ({err})"))?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Bool(flag) => Ok(Some(TagValue::Bool(flag))),
        serde_json::Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Ok(Some(TagValue::Int(int)))
            } else if let Some(float) = number.as_f64() {
                Ok(Some(TagValue::Float(float)))
            } else {
                Err("numeric value out of range".to_string())
            }
        }
        serde_json::Value::String(text) => Ok(Some(TagValue::Text(text))),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err("value is not a scalar".to_string())
        }
    }
}
