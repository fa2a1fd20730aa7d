//! Runtime virtual filesystem over a [`PathIndex`].
//!
//! [`VirtualFileSystem`] borrows an index and never mutates it, so any number
//! of filesystems and handles can share one index across threads. Each
//! [`Handle`] owns a private cursor: a byte position for files, or the number
//! of children already returned for directories.
//!
//! # Examples
//!
//! ```
//! use assetfs::{TreeBuilder, VirtualFileSystem};
//! # use tempfile::TempDir;
//!
//! # let temp = TempDir::new().unwrap();
//! # std::fs::write(temp.path().join("hello.txt"), "hello").unwrap();
//! let index = TreeBuilder::new(temp.path()).build().unwrap();
//! let vfs = VirtualFileSystem::new(&index);
//!
//! let mut file = vfs.open("hello.txt").unwrap();
//! let mut buf = [0u8; 16];
//! let n = file.read(&mut buf).unwrap();
//! assert_eq!(&buf[..n], b"hello");
//!
//! let mut root = vfs.open("/").unwrap();
//! let children = root.read_dir(0).unwrap();
//! assert_eq!(children[0].name(), "hello.txt");
//! ```

use crate::error::{FsError, Result};
use crate::fs::{File, FileSystem};
use crate::index::PathIndex;
use crate::path::AssetPath;
use crate::types::{Entry, EntryId, EntryKind, FileInfo};
use std::io::{self, SeekFrom};

/// Read-only filesystem answering queries from an in-memory index.
///
/// The absent filesystem ([`VirtualFileSystem::absent`]) stands in for a
/// bundle that was never registered: it answers every query with
/// [`FsError::NotFound`], exactly like a missing path in a real bundle.
///
/// # Thread Safety
///
/// This type is `Copy`, `Send` and `Sync`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualFileSystem<'a> {
    index: Option<&'a PathIndex>,
}

impl<'a> VirtualFileSystem<'a> {
    /// Creates a filesystem over the given index.
    #[must_use]
    pub const fn new(index: &'a PathIndex) -> Self {
        Self { index: Some(index) }
    }

    /// Creates the absent filesystem.
    ///
    /// # Examples
    ///
    /// ```
    /// use assetfs::VirtualFileSystem;
    ///
    /// let vfs = VirtualFileSystem::absent();
    /// assert!(vfs.open("/").unwrap_err().is_not_found());
    /// ```
    #[must_use]
    pub const fn absent() -> Self {
        Self { index: None }
    }

    /// Returns `true` for the absent filesystem.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.index.is_none()
    }

    /// The underlying index, if any.
    #[must_use]
    pub const fn index(&self) -> Option<&'a PathIndex> {
        self.index
    }

    /// Normalizes `path` and returns the identity it maps to.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NotFound`] if the path is not in the index or the
    /// filesystem is absent.
    pub fn resolve(&self, path: &str) -> Result<EntryId> {
        self.locate(path).map(|(_, _, id)| id)
    }

    /// Opens a handle on the entry at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NotFound`] if the path does not resolve.
    pub fn open(&self, path: &str) -> Result<Handle<'a>> {
        let (index, path, id) = self.locate(path)?;
        let entry = &index.entries()[id.index()];
        let cursor = match entry.kind() {
            EntryKind::File { .. } => {
                Cursor::File(io::Cursor::new(index.content(id).unwrap_or_default()))
            }
            EntryKind::Directory { children } => Cursor::Directory {
                children,
                listed: 0,
            },
        };
        Ok(Handle {
            index,
            entry,
            path,
            id,
            cursor,
        })
    }

    /// Returns metadata for the entry at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NotFound`] if the path does not resolve.
    pub fn stat(&self, path: &str) -> Result<FileInfo> {
        let (index, _, id) = self.locate(path)?;
        Ok(index.entries()[id.index()].info())
    }

    /// Returns the full contents of the file at `path` without copying.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NotFound`] if the path does not resolve and
    /// [`FsError::IsDirectory`] if it names a directory.
    pub fn read_file(&self, path: &str) -> Result<&'a [u8]> {
        let (index, path, id) = self.locate(path)?;
        index.content(id).ok_or_else(|| FsError::IsDirectory {
            path: path.into(),
        })
    }

    /// Returns `true` if `path` resolves to an entry.
    #[must_use]
    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok()
    }

    fn locate(&self, raw: &str) -> Result<(&'a PathIndex, AssetPath, EntryId)> {
        let path = AssetPath::normalize(raw);
        let found = self
            .index
            .and_then(|index| index.lookup(&path).map(|id| (index, id)));
        match found {
            Some((index, id)) => Ok((index, path, id)),
            None => Err(FsError::NotFound { path: path.into() }),
        }
    }
}

impl<'a> FileSystem for VirtualFileSystem<'a> {
    type File = Handle<'a>;

    fn open(&self, path: &str) -> Result<Handle<'a>> {
        VirtualFileSystem::open(self, path)
    }
}

/// Per-handle cursor.
#[derive(Debug, Clone)]
enum Cursor<'a> {
    File(io::Cursor<&'a [u8]>),
    Directory {
        children: &'a [EntryId],
        listed: usize,
    },
}

/// An open entry of a [`VirtualFileSystem`].
///
/// Dropping the handle is all closing takes; the index is never touched.
#[derive(Debug, Clone)]
pub struct Handle<'a> {
    index: &'a PathIndex,
    entry: &'a Entry,
    path: AssetPath,
    id: EntryId,
    cursor: Cursor<'a>,
}

impl<'a> Handle<'a> {
    /// Identity of the opened entry.
    #[must_use]
    pub const fn id(&self) -> EntryId {
        self.id
    }

    /// Normalized path the handle was opened with.
    #[must_use]
    pub const fn path(&self) -> &AssetPath {
        &self.path
    }

    /// The opened entry.
    #[must_use]
    pub const fn entry(&self) -> &'a Entry {
        self.entry
    }

    /// Returns the entry's metadata; directories report size 0.
    #[must_use]
    pub fn stat(&self) -> FileInfo {
        self.entry.info()
    }

    /// Copies bytes from the cursor into `buf`.
    ///
    /// Returns the number of bytes copied; `Ok(0)` with a non-empty buffer
    /// signals end of file.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::IsDirectory`] on a directory handle.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match &mut self.cursor {
            Cursor::File(cursor) => {
                io::Read::read(cursor, buf).map_err(|source| FsError::Io {
                    path: self.path.to_string(),
                    source,
                })
            }
            Cursor::Directory { .. } => Err(self.is_directory()),
        }
    }

    /// Moves the read cursor and returns the new absolute position.
    ///
    /// Seeking past the end is allowed; subsequent reads return 0 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::IsDirectory`] on a directory handle and
    /// [`FsError::InvalidSeek`] for a position before byte 0.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        match &mut self.cursor {
            Cursor::File(cursor) => io::Seek::seek(cursor, pos).map_err(|_| FsError::InvalidSeek {
                path: self.path.to_string(),
            }),
            Cursor::Directory { .. } => Err(self.is_directory()),
        }
    }

    /// Returns the next children as borrowed entries.
    ///
    /// See [`read_dir`](Self::read_dir) for the `count` semantics.
    ///
    /// # Errors
    ///
    /// Same as [`read_dir`](Self::read_dir).
    pub fn read_dir_entries(&mut self, count: usize) -> Result<Vec<&'a Entry>> {
        let (children, listed) = match &mut self.cursor {
            Cursor::Directory { children, listed } => (*children, listed),
            Cursor::File(_) => {
                return Err(FsError::InvalidOperation {
                    path: self.path.to_string(),
                });
            }
        };
        let remaining = children.get(*listed..).unwrap_or_default();

        // Unbounded listings report exhaustion as an empty batch, bounded
        // ones as EndOfStream. Callers branch on the difference.
        let batch = if count == 0 {
            remaining
        } else if remaining.is_empty() {
            return Err(FsError::EndOfStream {
                path: self.path.to_string(),
            });
        } else {
            &remaining[..count.min(remaining.len())]
        };
        *listed += batch.len();

        let entries = self.index.entries();
        Ok(batch.iter().map(|id| &entries[id.index()]).collect())
    }

    /// Returns metadata for the next children of a directory.
    ///
    /// - `count == 0`: every remaining child; an empty vector once exhausted.
    /// - `count > 0`: at most `count` children; [`FsError::EndOfStream`] once
    ///   exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::InvalidOperation`] on a file handle, and
    /// [`FsError::EndOfStream`] for an exhausted bounded listing.
    ///
    /// # Examples
    ///
    /// ```
    /// use assetfs::{Entry, EntryId, PathIndex, VirtualFileSystem};
    /// use std::collections::BTreeMap;
    ///
    /// let index = PathIndex::from_parts(
    ///     vec![b"a".to_vec(), b"b".to_vec()],
    ///     vec![
    ///         Entry::file("a", 1, 0o644, 0),
    ///         Entry::file("b", 1, 0o644, 0),
    ///         Entry::directory("root", 0o755, 0, vec![EntryId::new(0), EntryId::new(1)]),
    ///     ],
    ///     BTreeMap::from([
    ///         ("/a".to_string(), EntryId::new(0)),
    ///         ("/b".to_string(), EntryId::new(1)),
    ///         ("/".to_string(), EntryId::new(2)),
    ///     ]),
    /// )
    /// .unwrap();
    /// let vfs = VirtualFileSystem::new(&index);
    ///
    /// let mut dir = vfs.open("/").unwrap();
    /// assert_eq!(dir.read_dir(1).unwrap()[0].name(), "a");
    /// assert_eq!(dir.read_dir(1).unwrap()[0].name(), "b");
    /// assert!(dir.read_dir(1).unwrap_err().is_end_of_stream());
    /// assert!(dir.read_dir(0).unwrap().is_empty());
    /// ```
    pub fn read_dir(&mut self, count: usize) -> Result<Vec<FileInfo>> {
        Ok(self
            .read_dir_entries(count)?
            .into_iter()
            .map(Entry::info)
            .collect())
    }

    fn is_directory(&self) -> FsError {
        FsError::IsDirectory {
            path: self.path.to_string(),
        }
    }
}

impl io::Read for Handle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Handle::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Seek for Handle<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Handle::seek(self, pos).map_err(io::Error::from)
    }
}

impl File for Handle<'_> {
    fn stat(&self) -> Result<FileInfo> {
        Ok(Handle::stat(self))
    }

    fn read_dir(&mut self, count: usize) -> Result<Vec<FileInfo>> {
        Handle::read_dir(self, count)
    }
}
