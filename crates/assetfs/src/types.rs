//! Core types for asset filesystems.
//!
//! An [`Entry`] is either a file or a directory, modeled as [`EntryKind`] so
//! every query matches on the variant instead of testing a flag. Entries are
//! addressed by [`EntryId`] inside a [`PathIndex`](crate::PathIndex).
//!
//! # Examples
//!
//! ```
//! use assetfs::{Entry, EntryId};
//!
//! let file = Entry::file("red", 3, 0o644, 0);
//! let root = Entry::directory("static", 0o755, 0, vec![EntryId::new(0)]);
//!
//! assert_eq!(file.size(), 3);
//! assert!(root.is_dir());
//! assert_eq!(root.size(), 0);
//! assert_eq!(root.children(), &[EntryId::new(0)]);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Stable integer identity of an entry within one index.
///
/// Files occupy `[0, F)` and directories `[F, F + D)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(usize);

impl EntryId {
    /// Creates an identity from its raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index into the entry table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for EntryId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// File or directory payload of an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A regular file; its bytes live at the same identity in the contents table
    File {
        /// Length of the contents in bytes
        size: u64,
    },
    /// A directory with its children in listing order
    Directory {
        /// Child identities, files first then subdirectories
        children: Vec<EntryId>,
    },
}

/// A single file or directory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    name: String,
    mode: u32,
    mtime: i64,
    kind: EntryKind,
}

impl Entry {
    /// Creates a file entry.
    #[must_use]
    pub fn file(name: impl Into<String>, size: u64, mode: u32, mtime: i64) -> Self {
        Self {
            name: name.into(),
            mode,
            mtime,
            kind: EntryKind::File { size },
        }
    }

    /// Creates a directory entry.
    #[must_use]
    pub fn directory(
        name: impl Into<String>,
        mode: u32,
        mtime: i64,
        children: Vec<EntryId>,
    ) -> Self {
        Self {
            name: name.into(),
            mode,
            mtime,
            kind: EntryKind::Directory { children },
        }
    }

    /// Base name, not the full path.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// OS permission and type bits as recorded at build time.
    #[must_use]
    pub const fn mode(&self) -> u32 {
        self.mode
    }

    /// Modification time in nanoseconds since the Unix epoch.
    #[must_use]
    pub const fn mtime_nanos(&self) -> i64 {
        self.mtime
    }

    /// Modification time as a [`SystemTime`].
    #[must_use]
    pub fn modified(&self) -> SystemTime {
        system_time_from_nanos(self.mtime)
    }

    /// The file or directory payload.
    #[must_use]
    pub const fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Returns `true` for directories.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory { .. })
    }

    /// Size in bytes; always 0 for directories.
    #[must_use]
    pub const fn size(&self) -> u64 {
        match self.kind {
            EntryKind::File { size } => size,
            EntryKind::Directory { .. } => 0,
        }
    }

    /// Child identities; empty for files and empty directories.
    #[must_use]
    pub fn children(&self) -> &[EntryId] {
        match &self.kind {
            EntryKind::File { .. } => &[],
            EntryKind::Directory { children } => children,
        }
    }

    /// Returns an owned stat record for this entry.
    #[must_use]
    pub fn info(&self) -> FileInfo {
        FileInfo {
            name: self.name.clone(),
            size: self.size(),
            mode: self.mode,
            modified: self.modified(),
            is_dir: self.is_dir(),
        }
    }
}

/// Stat-style metadata returned by every filesystem implementation.
///
/// # Examples
///
/// ```
/// use assetfs::Entry;
///
/// let info = Entry::file("app.js", 42, 0o644, 1_000_000_000).info();
/// assert_eq!(info.name(), "app.js");
/// assert_eq!(info.len(), 42);
/// assert!(!info.is_dir());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub(crate) name: String,
    pub(crate) size: u64,
    pub(crate) mode: u32,
    pub(crate) modified: SystemTime,
    pub(crate) is_dir: bool,
}

impl FileInfo {
    /// Base name of the entry.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes; 0 for directories.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> u64 {
        self.size
    }

    /// OS permission and type bits.
    #[must_use]
    pub const fn mode(&self) -> u32 {
        self.mode
    }

    /// Modification time.
    #[must_use]
    pub const fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Returns `true` for directories.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Returns `true` for files.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        !self.is_dir
    }
}

pub(crate) fn system_time_from_nanos(nanos: i64) -> SystemTime {
    let offset = Duration::from_nanos(nanos.unsigned_abs());
    let time = if nanos >= 0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    };
    time.unwrap_or(UNIX_EPOCH)
}

pub(crate) fn nanos_from_system_time(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_nanos()).map_or(i64::MIN, |n| -n),
    }
}
