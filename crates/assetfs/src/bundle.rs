//! Named collection of path indexes, one per asset directory.
//!
//! A hosting program registers each embedded index under the cleaned path of
//! the directory it was built from, then asks for a filesystem by that name.
//! Unknown names yield the absent filesystem rather than an error, so callers
//! see an ordinary `NotFound` on first use.

use crate::builder::{BuildOptions, TreeBuilder};
use crate::error::{BuildError, IndexError};
use crate::index::{PathIndex, RawPathIndex};
use crate::vfs::VirtualFileSystem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path};

/// Indexes keyed by bundle name.
///
/// # Examples
///
/// ```
/// use assetfs::{AssetBundle, BuildOptions};
/// # use tempfile::TempDir;
///
/// # let temp = TempDir::new().unwrap();
/// # let dir = temp.path().join("static");
/// # std::fs::create_dir(&dir).unwrap();
/// # std::fs::write(dir.join("red"), "abc").unwrap();
/// let bundle = AssetBundle::build([&dir], &BuildOptions::default()).unwrap();
/// let name = bundle.names().next().unwrap().to_string();
///
/// let vfs = bundle.filesystem(&name);
/// assert_eq!(vfs.read_file("/red").unwrap(), b"abc");
/// assert!(bundle.filesystem("unknown").open("/").unwrap_err().is_not_found());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetBundle {
    indexes: BTreeMap<String, PathIndex>,
}

impl AssetBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one index per directory.
    ///
    /// Each index is keyed by [`bundle_name`] of its directory.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] hit by any directory, or
    /// [`BuildError::DuplicateBundle`] if two directories clean to the same
    /// name.
    pub fn build<I, P>(dirs: I, options: &BuildOptions) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut bundle = Self::new();
        for dir in dirs {
            let dir = dir.as_ref();
            let name = bundle_name(dir);
            if bundle.indexes.contains_key(&name) {
                return Err(BuildError::DuplicateBundle { name });
            }
            let index = TreeBuilder::new(dir)
                .with_options(options.clone())
                .build()?;
            bundle.indexes.insert(name, index);
        }
        tracing::info!(bundles = bundle.len(), "Built asset bundle");
        Ok(bundle)
    }

    /// Registers `index` under `name`, returning any index it replaces.
    pub fn insert(&mut self, name: impl AsRef<str>, index: PathIndex) -> Option<PathIndex> {
        self.indexes
            .insert(bundle_name(Path::new(name.as_ref())), index)
    }

    /// Returns the index registered under `name`.
    ///
    /// The name is cleaned first, so `./static/` finds `static`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PathIndex> {
        self.indexes.get(&bundle_name(Path::new(name)))
    }

    /// Returns a filesystem over the index registered under `name`, or the
    /// absent filesystem if there is none.
    #[must_use]
    pub fn filesystem(&self, name: &str) -> VirtualFileSystem<'_> {
        self.get(name)
            .map_or_else(VirtualFileSystem::absent, VirtualFileSystem::new)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.indexes.keys().map(String::as_str)
    }

    /// Iterates over `(name, index)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PathIndex)> {
        self.indexes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of registered indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Decodes and validates a JSON-encoded bundle.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Decode`] for malformed input and
    /// [`IndexError::Inconsistent`], prefixed with the bundle name, for a
    /// well-formed index that violates an invariant.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IndexError> {
        Self::from_raw(serde_json::from_slice(bytes)?)
    }

    /// Decodes a bundle from a JSON string.
    ///
    /// # Errors
    ///
    /// Same as [`from_slice`](Self::from_slice).
    pub fn from_json(json: &str) -> Result<Self, IndexError> {
        Self::from_slice(json.as_bytes())
    }

    /// Decodes a bundle from a reader.
    ///
    /// # Errors
    ///
    /// Same as [`from_slice`](Self::from_slice).
    pub fn from_reader(reader: impl io::Read) -> Result<Self, IndexError> {
        Self::from_raw(serde_json::from_reader(reader)?)
    }

    fn from_raw(raw: BTreeMap<String, RawPathIndex>) -> Result<Self, IndexError> {
        let indexes: BTreeMap<String, PathIndex> = raw
            .into_iter()
            .map(|(name, index)| match index.validate() {
                Ok(index) => Ok((name, index)),
                Err(IndexError::Inconsistent { reason }) => Err(IndexError::inconsistent(
                    format!("bundle {name}: {reason}"),
                )),
                Err(err) => Err(err),
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { indexes })
    }

    /// Encodes the bundle as JSON into `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn to_writer(&self, writer: impl io::Write) -> serde_json::Result<()> {
        serde_json::to_writer(writer, self)
    }
}

/// Cleans a directory path into its bundle name.
///
/// The cleaning is lexical: `.` segments and trailing separators are
/// dropped, `name/..` pairs cancel, and an empty result becomes `.`.
///
/// # Examples
///
/// ```
/// use assetfs::bundle_name;
/// use std::path::Path;
///
/// assert_eq!(bundle_name(Path::new("./static/")), "static");
/// assert_eq!(bundle_name(Path::new("web/../static")), "static");
/// assert_eq!(bundle_name(Path::new("../shared")), "../shared");
/// assert_eq!(bundle_name(Path::new("")), ".");
/// ```
#[must_use]
pub fn bundle_name(dir: &Path) -> String {
    let mut prefix = String::new();
    let mut parts: Vec<String> = Vec::new();
    for component in dir.components() {
        match component {
            Component::Prefix(p) => prefix.push_str(&p.as_os_str().to_string_lossy()),
            Component::RootDir => prefix.push('/'),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.last().is_some_and(|last| last != "..") {
                    parts.pop();
                } else if !prefix.ends_with('/') {
                    parts.push("..".to_string());
                }
            }
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
        }
    }

    let joined = parts.join("/");
    if prefix.is_empty() && joined.is_empty() {
        ".".to_string()
    } else {
        prefix + &joined
    }
}
