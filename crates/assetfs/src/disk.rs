//! Development-mode filesystem that reads straight from disk.
//!
//! [`DiskFileSystem`] answers the same queries as
//! [`VirtualFileSystem`](crate::VirtualFileSystem) without a build step, so a
//! program can serve live assets while developing and the embedded bundle in
//! release. Paths are normalized the same way, directory listings put files
//! before subdirectories (each in name order), and exhausted listings follow
//! the same empty-versus-[`EndOfStream`](crate::FsError::EndOfStream) rule.

use crate::builder::mode_bits;
use crate::error::{FsError, Result};
use crate::fs::{File, FileSystem};
use crate::path::AssetPath;
use crate::types::FileInfo;
use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Read-only view of a directory on disk.
///
/// # Examples
///
/// ```
/// use assetfs::{DiskFileSystem, File, FileSystem};
/// # use tempfile::TempDir;
///
/// # let temp = TempDir::new().unwrap();
/// # std::fs::write(temp.path().join("app.js"), "run()").unwrap();
/// let fs = DiskFileSystem::new(temp.path());
/// let info = fs.open("/app.js").unwrap().stat().unwrap();
/// assert_eq!(info.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct DiskFileSystem {
    root: PathBuf,
}

impl DiskFileSystem {
    /// Creates a filesystem rooted at `root`.
    ///
    /// The root is not checked until the first `open`.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The on-disk root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Opens the entry at `path`.
    ///
    /// `..` segments are resolved lexically before touching the disk, so a
    /// request can never escape the root.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NotFound`] if nothing exists at the path and
    /// [`FsError::Io`] for any other failure.
    pub fn open(&self, path: &str) -> Result<DiskFile> {
        let path = AssetPath::normalize(path);
        let full = self.root.join(path.relative());
        let meta = fs::metadata(&full).map_err(|source| io_error(&path, source))?;

        let name = match path.file_name() {
            Some(name) => name.to_string(),
            None => self
                .root
                .file_name()
                .map_or_else(|| "/".to_string(), |n| n.to_string_lossy().into_owned()),
        };
        let info = file_info(name, &meta);

        let state = if meta.is_dir() {
            State::Directory {
                children: None,
                listed: 0,
            }
        } else {
            let file = fs::File::open(&full).map_err(|source| io_error(&path, source))?;
            State::File(file)
        };

        tracing::trace!(path = %path, dir = info.is_dir(), "Opened disk entry");
        Ok(DiskFile {
            path,
            full,
            info,
            state,
        })
    }
}

impl FileSystem for DiskFileSystem {
    type File = DiskFile;

    fn open(&self, path: &str) -> Result<DiskFile> {
        Self::open(self, path)
    }
}

#[derive(Debug)]
enum State {
    File(fs::File),
    Directory {
        // Read from disk on the first listing call.
        children: Option<Vec<FileInfo>>,
        listed: usize,
    },
}

/// An open entry of a [`DiskFileSystem`].
#[derive(Debug)]
pub struct DiskFile {
    path: AssetPath,
    full: PathBuf,
    info: FileInfo,
    state: State,
}

impl DiskFile {
    /// Normalized path the file was opened with.
    #[must_use]
    pub const fn path(&self) -> &AssetPath {
        &self.path
    }

    fn load_children(&self) -> Result<Vec<FileInfo>> {
        let mut files = Vec::new();
        let mut dirs = Vec::new();
        let reader = fs::read_dir(&self.full).map_err(|source| io_error(&self.path, source))?;
        for item in reader {
            let item = item.map_err(|source| io_error(&self.path, source))?;
            let name = item.file_name().to_string_lossy().into_owned();
            // Follow links the way `open` does; a dangling link fails the listing.
            let meta = fs::metadata(item.path()).map_err(|source| FsError::Io {
                path: AssetPath::from_segments(self.path.as_str().split('/').chain([name.as_str()]))
                    .to_string(),
                source,
            })?;
            let info = file_info(name, &meta);
            if meta.is_dir() {
                dirs.push(info);
            } else if meta.is_file() {
                files.push(info);
            }
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        dirs.sort_by(|a, b| a.name.cmp(&b.name));
        files.extend(dirs);
        Ok(files)
    }
}

impl Read for DiskFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.state {
            State::File(file) => file.read(buf),
            State::Directory { .. } => Err(FsError::IsDirectory {
                path: self.path.to_string(),
            }
            .into()),
        }
    }
}

impl Seek for DiskFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.state {
            State::File(file) => file.seek(pos),
            State::Directory { .. } => Err(FsError::IsDirectory {
                path: self.path.to_string(),
            }
            .into()),
        }
    }
}

impl File for DiskFile {
    fn stat(&self) -> Result<FileInfo> {
        Ok(self.info.clone())
    }

    fn read_dir(&mut self, count: usize) -> Result<Vec<FileInfo>> {
        let needs_load = match &self.state {
            State::File(_) => {
                return Err(FsError::InvalidOperation {
                    path: self.path.to_string(),
                });
            }
            State::Directory { children, .. } => children.is_none(),
        };
        let loaded = if needs_load {
            Some(self.load_children()?)
        } else {
            None
        };

        let State::Directory { children, listed } = &mut self.state else {
            return Ok(Vec::new());
        };
        if let Some(loaded) = loaded {
            *children = Some(loaded);
        }
        let remaining = children
            .as_deref()
            .and_then(|all| all.get(*listed..))
            .unwrap_or_default();

        let take = if count == 0 {
            remaining.len()
        } else if remaining.is_empty() {
            return Err(FsError::EndOfStream {
                path: self.path.to_string(),
            });
        } else {
            count.min(remaining.len())
        };
        let batch = remaining[..take].to_vec();
        *listed += take;
        Ok(batch)
    }
}

fn file_info(name: String, meta: &fs::Metadata) -> FileInfo {
    FileInfo {
        name,
        size: if meta.is_dir() { 0 } else { meta.len() },
        mode: mode_bits(meta),
        modified: meta.modified().unwrap_or(UNIX_EPOCH),
        is_dir: meta.is_dir(),
    }
}

fn io_error(path: &AssetPath, source: io::Error) -> FsError {
    if source.kind() == io::ErrorKind::NotFound {
        FsError::NotFound {
            path: path.to_string(),
        }
    } else {
        FsError::Io {
            path: path.to_string(),
            source,
        }
    }
}
