//! Filesystem traits shared by the embedded and disk-backed implementations.
//!
//! A hosting program written against [`FileSystem`] can swap the embedded
//! [`VirtualFileSystem`](crate::VirtualFileSystem) for a
//! [`DiskFileSystem`](crate::DiskFileSystem) during development without any
//! other change.
//!
//! # Examples
//!
//! ```
//! use assetfs::{File, FileSystem};
//! use std::io::Read;
//!
//! fn serve<F: FileSystem>(fs: &F, path: &str) -> assetfs::Result<Vec<u8>> {
//!     let mut file = fs.open(path)?;
//!     let mut body = Vec::new();
//!     file.read_to_end(&mut body).map_err(|source| assetfs::FsError::Io {
//!         path: path.to_string(),
//!         source,
//!     })?;
//!     Ok(body)
//! }
//! ```

use crate::error::Result;
use crate::types::FileInfo;
use std::io;

/// A hierarchical, read-only filesystem.
pub trait FileSystem {
    /// Handle type returned by [`open`](Self::open).
    type File: File;

    /// Opens the entry at `path`.
    ///
    /// The path is normalized first: a leading `/` is implied, `.` and `..`
    /// are resolved lexically and repeated slashes collapse.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NotFound`](crate::FsError::NotFound) if nothing
    /// exists at the normalized path.
    fn open(&self, path: &str) -> Result<Self::File>;
}

/// An open file or directory with a private cursor.
///
/// For files, [`io::Read`] and [`io::Seek`] behave like a byte stream; on a
/// directory they fail with [`io::ErrorKind::IsADirectory`].
pub trait File: io::Read + io::Seek {
    /// Returns the entry's metadata.
    ///
    /// # Errors
    ///
    /// Disk-backed implementations may fail with an I/O error.
    fn stat(&self) -> Result<FileInfo>;

    /// Lists the next children of a directory.
    ///
    /// With `count == 0` every remaining child is returned, and an exhausted
    /// listing yields an empty vector. With `count > 0` at most `count`
    /// children are returned, and an exhausted listing fails with
    /// [`FsError::EndOfStream`](crate::FsError::EndOfStream).
    ///
    /// # Errors
    ///
    /// Returns [`FsError::InvalidOperation`](crate::FsError::InvalidOperation)
    /// on a file, and `EndOfStream` as described above.
    fn read_dir(&mut self, count: usize) -> Result<Vec<FileInfo>>;
}
