//! The serialized path index: entries, file contents and the path map.
//!
//! A [`PathIndex`] is built once by [`TreeBuilder`](crate::TreeBuilder) and is
//! immutable afterwards. Every way of obtaining one (building, decoding,
//! [`PathIndex::from_parts`]) checks the same invariants:
//!
//! - files occupy identities `[0, F)`, directories `[F, F + D)`
//! - `contents[i]` exists iff entry `i` is a file, and its length is the file size
//! - every child identity exists and has exactly one parent directory
//! - the path map is a bijection onto the entries, keyed by normalized paths,
//!   and each path's parent path maps to the entry's parent directory
//! - `/` maps to a directory
//!
//! # Examples
//!
//! ```
//! use assetfs::{Entry, EntryId, PathIndex};
//! use std::collections::BTreeMap;
//!
//! let index = PathIndex::from_parts(
//!     vec![b"abc".to_vec()],
//!     vec![
//!         Entry::file("red", 3, 0o644, 0),
//!         Entry::directory("static", 0o755, 0, vec![EntryId::new(0)]),
//!     ],
//!     BTreeMap::from([
//!         ("/red".to_string(), EntryId::new(0)),
//!         ("/".to_string(), EntryId::new(1)),
//!     ]),
//! )
//! .unwrap();
//!
//! assert_eq!(index.file_count(), 1);
//! assert_eq!(index.content(EntryId::new(0)), Some(&b"abc"[..]));
//! ```

use crate::error::IndexError;
use crate::path::AssetPath;
use crate::types::{Entry, EntryId, EntryKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable index of a walked directory tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPathIndex")]
pub struct PathIndex {
    contents: Vec<Vec<u8>>,
    entries: Vec<Entry>,
    paths: BTreeMap<String, EntryId>,
    #[serde(skip)]
    root: EntryId,
}

/// Decoded but not yet validated form of [`PathIndex`].
#[derive(Deserialize)]
pub(crate) struct RawPathIndex {
    contents: Vec<Vec<u8>>,
    entries: Vec<Entry>,
    paths: BTreeMap<String, EntryId>,
}

impl RawPathIndex {
    pub(crate) fn validate(self) -> Result<PathIndex, IndexError> {
        PathIndex::from_parts(self.contents, self.entries, self.paths)
    }
}

impl TryFrom<RawPathIndex> for PathIndex {
    type Error = IndexError;

    fn try_from(raw: RawPathIndex) -> Result<Self, Self::Error> {
        raw.validate()
    }
}

impl PathIndex {
    /// Assembles an index from its three tables, validating every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Inconsistent`] naming the first violated
    /// invariant.
    pub fn from_parts(
        contents: Vec<Vec<u8>>,
        entries: Vec<Entry>,
        paths: BTreeMap<String, EntryId>,
    ) -> Result<Self, IndexError> {
        let root = validate(&contents, &entries, &paths)?;
        Ok(Self {
            contents,
            entries,
            paths,
            root,
        })
    }

    /// Assembles builder output, which satisfies the invariants by construction.
    pub(crate) fn assemble(
        contents: Vec<Vec<u8>>,
        entries: Vec<Entry>,
        paths: BTreeMap<String, EntryId>,
    ) -> Self {
        debug_assert!(validate(&contents, &entries, &paths).is_ok());
        let root = paths.get("/").copied().unwrap_or_default();
        Self {
            contents,
            entries,
            paths,
            root,
        }
    }

    /// Decodes and validates a JSON-encoded index.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Decode`] for malformed input and
    /// [`IndexError::Inconsistent`] for a well-formed but invalid index.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IndexError> {
        serde_json::from_slice::<RawPathIndex>(bytes)?.validate()
    }

    /// Encodes the index as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Identity of the root directory `/`.
    #[must_use]
    pub const fn root(&self) -> EntryId {
        self.root
    }

    /// Looks up a normalized path.
    #[must_use]
    pub fn lookup(&self, path: &AssetPath) -> Option<EntryId> {
        self.paths.get(path.as_str()).copied()
    }

    /// Returns the entry for an identity.
    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.index())
    }

    /// Returns the bytes of a file entry, or `None` for directories.
    #[must_use]
    pub fn content(&self, id: EntryId) -> Option<&[u8]> {
        self.contents.get(id.index()).map(Vec::as_slice)
    }

    /// Returns `true` if the identity falls in the file range.
    #[must_use]
    pub fn is_file_id(&self, id: EntryId) -> bool {
        id.index() < self.contents.len()
    }

    /// All entries, files first.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// All `(path, identity)` pairs in path order.
    pub fn paths(&self) -> impl Iterator<Item = (&str, EntryId)> {
        self.paths.iter().map(|(path, id)| (path.as_str(), *id))
    }

    /// Number of file entries.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.contents.len()
    }

    /// Number of directory entries, including the root.
    #[must_use]
    pub fn dir_count(&self) -> usize {
        self.entries.len() - self.contents.len()
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the entry table is empty.
    ///
    /// A validated index always holds its root directory, so this is `false`
    /// for every `PathIndex`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all file sizes in bytes.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.contents.iter().map(|c| c.len() as u64).sum()
    }
}

fn validate(
    contents: &[Vec<u8>],
    entries: &[Entry],
    paths: &BTreeMap<String, EntryId>,
) -> Result<EntryId, IndexError> {
    let file_count = entries.iter().take_while(|e| !e.is_dir()).count();
    if let Some(pos) = entries[file_count..].iter().position(|e| !e.is_dir()) {
        return Err(IndexError::inconsistent(format!(
            "file entry {} follows a directory",
            file_count + pos
        )));
    }
    if contents.len() != file_count {
        return Err(IndexError::inconsistent(format!(
            "{} content buffers for {file_count} files",
            contents.len()
        )));
    }
    for (i, (entry, data)) in entries.iter().zip(contents).enumerate() {
        if entry.size() != data.len() as u64 {
            return Err(IndexError::inconsistent(format!(
                "file entry {i} has size {} but {} bytes of content",
                entry.size(),
                data.len()
            )));
        }
    }

    let mut parent_of: Vec<Option<EntryId>> = vec![None; entries.len()];
    for (i, entry) in entries.iter().enumerate().skip(file_count) {
        let EntryKind::Directory { children } = entry.kind() else {
            continue;
        };
        for child in children {
            let Some(slot) = parent_of.get_mut(child.index()) else {
                return Err(IndexError::inconsistent(format!(
                    "directory {i} references missing entry {child}"
                )));
            };
            if slot.is_some() {
                return Err(IndexError::inconsistent(format!(
                    "entry {child} has more than one parent"
                )));
            }
            *slot = Some(EntryId::new(i));
        }
    }

    if paths.len() != entries.len() {
        return Err(IndexError::inconsistent(format!(
            "{} paths for {} entries",
            paths.len(),
            entries.len()
        )));
    }
    let mut seen = vec![false; entries.len()];
    for (path, id) in paths {
        let Some(entry) = entries.get(id.index()) else {
            return Err(IndexError::inconsistent(format!(
                "path {path} maps to missing entry {id}"
            )));
        };
        if std::mem::replace(&mut seen[id.index()], true) {
            return Err(IndexError::inconsistent(format!(
                "entry {id} has more than one path"
            )));
        }

        let normalized = AssetPath::normalize(path);
        if normalized.as_str() != path {
            return Err(IndexError::inconsistent(format!(
                "path {path} is not normalized"
            )));
        }
        let expected_parent = match normalized.parent() {
            Some(parent) => {
                if normalized.file_name() != Some(entry.name()) {
                    return Err(IndexError::inconsistent(format!(
                        "path {path} names entry {id} called {}",
                        entry.name()
                    )));
                }
                Some(paths.get(parent.as_str()).copied().ok_or_else(|| {
                    IndexError::inconsistent(format!("path {path} has no parent directory"))
                })?)
            }
            None => None,
        };
        if parent_of[id.index()] != expected_parent {
            return Err(IndexError::inconsistent(format!(
                "entry {id} at {path} is not linked from its parent directory"
            )));
        }
    }

    match paths.get("/") {
        Some(&root) if entries[root.index()].is_dir() => Ok(root),
        Some(_) => Err(IndexError::inconsistent("root path is not a directory")),
        None => Err(IndexError::inconsistent("missing root path")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_green() -> (Vec<Vec<u8>>, Vec<Entry>, BTreeMap<String, EntryId>) {
        (
            vec![b"abc".to_vec(), b"cde".to_vec()],
            vec![
                Entry::file("red", 3, 0o644, 0),
                Entry::file("green", 3, 0o644, 0),
                Entry::directory("static", 0o755, 0, vec![EntryId::new(0), EntryId::new(1)]),
            ],
            BTreeMap::from([
                ("/red".to_string(), EntryId::new(0)),
                ("/green".to_string(), EntryId::new(1)),
                ("/".to_string(), EntryId::new(2)),
            ]),
        )
    }

    #[test]
    fn test_from_parts_valid() {
        let (contents, entries, paths) = red_green();
        let index = PathIndex::from_parts(contents, entries, paths).unwrap();

        assert_eq!(index.root(), EntryId::new(2));
        assert_eq!(index.file_count(), 2);
        assert_eq!(index.dir_count(), 1);
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
        assert_eq!(index.total_bytes(), 6);
        assert!(index.is_file_id(EntryId::new(1)));
        assert!(!index.is_file_id(EntryId::new(2)));
        assert_eq!(index.content(EntryId::new(2)), None);
        assert_eq!(
            index.lookup(&AssetPath::normalize("green")),
            Some(EntryId::new(1))
        );
    }

    #[test]
    fn test_rejects_file_after_directory() {
        let (contents, mut entries, paths) = red_green();
        entries.swap(1, 2);
        let err = PathIndex::from_parts(contents, entries, paths).unwrap_err();
        assert!(err.to_string().contains("follows a directory"));
    }

    #[test]
    fn test_rejects_content_count_mismatch() {
        let (mut contents, entries, paths) = red_green();
        contents.pop();
        assert!(PathIndex::from_parts(contents, entries, paths).is_err());
    }

    #[test]
    fn test_rejects_size_mismatch() {
        let (mut contents, entries, paths) = red_green();
        contents[0] = b"abcd".to_vec();
        assert!(PathIndex::from_parts(contents, entries, paths).is_err());
    }

    #[test]
    fn test_rejects_missing_child() {
        let (contents, mut entries, paths) = red_green();
        entries[2] = Entry::directory("static", 0o755, 0, vec![EntryId::new(0), EntryId::new(9)]);
        let err = PathIndex::from_parts(contents, entries, paths).unwrap_err();
        assert!(err.to_string().contains("missing entry"));
    }

    #[test]
    fn test_rejects_orphan_entry() {
        let (contents, mut entries, paths) = red_green();
        entries[2] = Entry::directory("static", 0o755, 0, vec![EntryId::new(0)]);
        assert!(PathIndex::from_parts(contents, entries, paths).is_err());
    }

    #[test]
    fn test_rejects_missing_root() {
        let (contents, entries, mut paths) = red_green();
        paths.remove("/");
        paths.insert("/static".to_string(), EntryId::new(2));
        assert!(PathIndex::from_parts(contents, entries, paths).is_err());
    }

    #[test]
    fn test_rejects_root_file() {
        let err = PathIndex::from_parts(
            vec![Vec::new()],
            vec![Entry::file("x", 0, 0o644, 0)],
            BTreeMap::from([("/".to_string(), EntryId::new(0))]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("root"));
    }

    #[test]
    fn test_rejects_duplicate_path_targets() {
        let (contents, entries, mut paths) = red_green();
        paths.insert("/green".to_string(), EntryId::new(0));
        assert!(PathIndex::from_parts(contents, entries, paths).is_err());
    }

    #[test]
    fn test_rejects_unnormalized_path() {
        let (contents, entries, mut paths) = red_green();
        paths.remove("/red");
        paths.insert("red".to_string(), EntryId::new(0));
        let err = PathIndex::from_parts(contents, entries, paths).unwrap_err();
        assert!(err.to_string().contains("not normalized"));
    }

    #[test]
    fn test_json_round_trip_revalidates() {
        let (contents, entries, paths) = red_green();
        let index = PathIndex::from_parts(contents, entries, paths).unwrap();

        let bytes = index.to_vec().unwrap();
        let decoded = PathIndex::from_slice(&bytes).unwrap();
        assert_eq!(decoded, index);
        assert_eq!(decoded.root(), EntryId::new(2));
    }

    #[test]
    fn test_decode_rejects_inconsistent_index() {
        let json = r#"{"contents":[[97]],"entries":[{"name":"x","mode":0,"mtime":0,"kind":{"file":{"size":1}}}],"paths":{"/":0}}"#;
        let err = PathIndex::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, IndexError::Inconsistent { .. }), "{err}");
        assert!(err.to_string().contains("root path is not a directory"), "{err}");
    }

    #[test]
    fn test_decode_reports_size_mismatch() {
        let (contents, entries, paths) = red_green();
        let index = PathIndex::from_parts(contents, entries, paths).unwrap();
        let json = String::from_utf8(index.to_vec().unwrap()).unwrap();
        let tampered = json.replacen("\"size\":3", "\"size\":4", 1);
        assert_ne!(json, tampered);

        let err = PathIndex::from_slice(tampered.as_bytes()).unwrap_err();
        assert!(matches!(err, IndexError::Inconsistent { .. }), "{err}");
        assert!(err.to_string().contains("size 4 but 3 bytes"), "{err}");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = PathIndex::from_slice(b"not json").unwrap_err();
        assert!(matches!(err, IndexError::Decode(_)));
        assert!(err.to_string().contains("expected"), "{err}");
    }

    #[test]
    fn test_validated_index_is_never_empty() {
        let (contents, entries, paths) = red_green();
        let index = PathIndex::from_parts(contents, entries, paths).unwrap();
        assert!(!index.is_empty());
        assert!(PathIndex::from_parts(vec![], vec![], BTreeMap::new()).is_err());
    }
}
