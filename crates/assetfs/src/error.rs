//! Error types for building and querying asset filesystems.
//!
//! Build-time failures ([`BuildError`]) always name the offending path.
//! Runtime failures ([`FsError`]) carry only their kind plus the path queried,
//! and implement `is_xxx()` methods for easy classification.
//!
//! # Examples
//!
//! ```
//! use assetfs::FsError;
//!
//! let error = FsError::NotFound {
//!     path: "/missing.txt".to_string(),
//! };
//!
//! assert!(error.is_not_found());
//! assert!(!error.is_directory());
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for runtime filesystem queries.
pub type Result<T> = std::result::Result<T, FsError>;

/// Errors that abort building a [`PathIndex`](crate::PathIndex).
///
/// No partial index is ever returned alongside one of these.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The walk root does not exist
    #[error("Asset root not found: {}", path.display())]
    RootNotFound {
        /// The root that was requested
        path: PathBuf,
    },

    /// The walk root exists but is not a directory
    #[error("Asset root is not a directory: {}", path.display())]
    RootNotDirectory {
        /// The root that was requested
        path: PathBuf,
    },

    /// A regular file is larger than the configured ceiling
    #[error("File {} size {size} exceeds max allowed size {limit}", path.display())]
    FileTooLarge {
        /// The oversized file
        path: PathBuf,
        /// Its size in bytes
        size: u64,
        /// The ceiling in effect
        limit: u64,
    },

    /// Reading a file or its metadata failed
    #[error("Failed to read {}", path.display())]
    Io {
        /// The path being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Directory traversal failed (permission denied, symlink loop, ...)
    #[error("Failed to walk {}", path.display())]
    Walk {
        /// The path where traversal failed
        path: PathBuf,
        /// Underlying walkdir error
        #[source]
        source: walkdir::Error,
    },

    /// An entry name is not valid UTF-8
    #[error("Entry name is not valid UTF-8: {}", path.display())]
    InvalidName {
        /// The path with the offending name
        path: PathBuf,
    },

    /// Two asset directories map to the same bundle name
    #[error("Duplicate asset directory: {name}")]
    DuplicateBundle {
        /// The conflicting bundle name
        name: String,
    },
}

impl BuildError {
    /// Returns `true` if the build failed because of the file size ceiling.
    ///
    /// # Examples
    ///
    /// ```
    /// use assetfs::BuildError;
    ///
    /// let error = BuildError::FileTooLarge {
    ///     path: "big.bin".into(),
    ///     size: 11 << 20,
    ///     limit: 10 << 20,
    /// };
    ///
    /// assert!(error.is_too_large());
    /// ```
    #[must_use]
    pub const fn is_too_large(&self) -> bool {
        matches!(self, Self::FileTooLarge { .. })
    }

    /// Returns `true` if the walk root was missing or not a directory.
    #[must_use]
    pub const fn is_invalid_root(&self) -> bool {
        matches!(self, Self::RootNotFound { .. } | Self::RootNotDirectory { .. })
    }
}

/// Errors returned by filesystem queries.
///
/// # Examples
///
/// ```
/// use assetfs::FsError;
///
/// let error = FsError::IsDirectory {
///     path: "/static".to_string(),
/// };
///
/// assert!(error.is_directory());
/// assert!(!error.is_not_found());
/// ```
#[derive(Error, Debug)]
pub enum FsError {
    /// Path does not resolve to any entry, or the filesystem is absent
    #[error("File not found: {path}")]
    NotFound {
        /// The path that was queried
        path: String,
    },

    /// Byte read or seek attempted on a directory
    #[error("Is a directory: {path}")]
    IsDirectory {
        /// The directory path
        path: String,
    },

    /// Child listing attempted on a file
    #[error("Invalid operation on file: {path}")]
    InvalidOperation {
        /// The file path
        path: String,
    },

    /// Bounded listing called again after all children were returned
    #[error("End of directory listing: {path}")]
    EndOfStream {
        /// The directory path
        path: String,
    },

    /// Seek to a position before the start of the file
    #[error("Invalid seek to a negative position: {path}")]
    InvalidSeek {
        /// The file path
        path: String,
    },

    /// I/O failure in a disk-backed filesystem
    #[error("I/O error on {path}")]
    Io {
        /// The path being accessed
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Returns `true` if this is a not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if a read or seek hit a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self, Self::IsDirectory { .. })
    }

    /// Returns `true` if a listing was attempted on a file.
    #[must_use]
    pub const fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation { .. })
    }

    /// Returns `true` if a bounded listing is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use assetfs::FsError;
    ///
    /// let error = FsError::EndOfStream {
    ///     path: "/".to_string(),
    /// };
    ///
    /// assert!(error.is_end_of_stream());
    /// ```
    #[must_use]
    pub const fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream { .. })
    }

    /// Returns the path the failing query was made against.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path }
            | Self::IsDirectory { path }
            | Self::InvalidOperation { path }
            | Self::EndOfStream { path }
            | Self::InvalidSeek { path }
            | Self::Io { path, .. } => path,
        }
    }
}

impl From<FsError> for io::Error {
    fn from(error: FsError) -> Self {
        let kind = match &error {
            FsError::NotFound { .. } => io::ErrorKind::NotFound,
            FsError::IsDirectory { .. } => io::ErrorKind::IsADirectory,
            FsError::InvalidOperation { .. } | FsError::InvalidSeek { .. } => {
                io::ErrorKind::InvalidInput
            }
            FsError::EndOfStream { .. } => io::ErrorKind::UnexpectedEof,
            FsError::Io { source, .. } => source.kind(),
        };
        Self::new(kind, error)
    }
}

/// Errors raised when decoding or validating a serialized index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The serialized bytes are not a valid encoding
    #[error("Failed to decode asset index: {0}")]
    Decode(#[from] serde_json::Error),

    /// The decoded value violates an index invariant
    #[error("Inconsistent asset index: {reason}")]
    Inconsistent {
        /// Which invariant was violated
        reason: String,
    },
}

impl IndexError {
    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        Self::Inconsistent {
            reason: reason.into(),
        }
    }
}

/// Errors raised while writing a serialized bundle to disk.
#[derive(Error, Debug)]
pub enum EmitError {
    /// Creating, writing or syncing the output failed
    #[error("Failed to write {}", path.display())]
    Io {
        /// The output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Serializing the bundle failed
    #[error("Failed to encode asset bundle")]
    Encode(#[from] serde_json::Error),

    /// Renaming the temporary file over the destination failed
    #[error("Failed to persist {}", path.display())]
    Persist {
        /// The output path
        path: PathBuf,
        /// Underlying persist error
        #[source]
        source: tempfile::PersistError,
    },
}
