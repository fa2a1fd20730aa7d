//! Build-time tree walker producing a [`PathIndex`].
//!
//! The walk is a single depth-first pass over the root with children sorted
//! by file name, so repeated builds of unchanged input produce identical
//! indexes. Identities are assigned in two phases:
//!
//! 1. During the walk, files get their final identity (`0, 1, 2, ...` in
//!    visitation order) while directories get a provisional sequence number.
//! 2. After the walk, every directory number is shifted by the final file
//!    count, and child lists and the path map are rewritten with the shifted
//!    identities.
//!
//! Within a directory, children are listed files first, then subdirectories,
//! each group in name order.
//!
//! # Examples
//!
//! ```
//! use assetfs::TreeBuilder;
//! # use tempfile::TempDir;
//!
//! # let temp = TempDir::new().unwrap();
//! # let root = temp.path();
//! std::fs::write(root.join("index.html"), "<html></html>").unwrap();
//! std::fs::create_dir(root.join("css")).unwrap();
//! std::fs::write(root.join("css/site.css"), "body {}").unwrap();
//!
//! let index = TreeBuilder::new(root).build().unwrap();
//! assert_eq!(index.file_count(), 2);
//! assert_eq!(index.dir_count(), 2);
//! ```

use crate::error::BuildError;
use crate::index::PathIndex;
use crate::path::AssetPath;
use crate::types::{Entry, EntryId, nanos_from_system_time};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Default per-file size ceiling: 10 MiB.
pub const MAX_FILE_SIZE: u64 = 10 << 20;

/// Options controlling a build.
///
/// # Examples
///
/// ```
/// use assetfs::{BuildOptions, MAX_FILE_SIZE};
///
/// let options = BuildOptions::default();
/// assert_eq!(options.max_file_size, MAX_FILE_SIZE);
///
/// let options = BuildOptions::new()
///     .with_max_file_size(1 << 20)
///     .with_follow_links(true);
/// assert!(options.follow_links);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Largest accepted file in bytes; anything bigger aborts the build
    pub max_file_size: u64,
    /// Follow symbolic links instead of skipping them
    pub follow_links: bool,
}

impl BuildOptions {
    /// Creates options with defaults.
    ///
    /// Defaults:
    /// - `max_file_size`: [`MAX_FILE_SIZE`]
    /// - `follow_links`: false
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            follow_links: false,
        }
    }

    /// Sets the per-file size ceiling.
    #[must_use]
    pub const fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Sets whether symbolic links are followed.
    #[must_use]
    pub const fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks a directory and produces its [`PathIndex`].
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    root: PathBuf,
    options: BuildOptions,
}

/// Identity assigned during the walk, before directories are shifted.
#[derive(Debug, Clone, Copy)]
enum Slot {
    File(usize),
    Dir(usize),
}

#[derive(Debug)]
struct DirRecord {
    name: String,
    mode: u32,
    mtime: i64,
    files: Vec<usize>,
    subdirs: Vec<usize>,
}

#[derive(Debug, Default)]
struct Walk {
    files: Vec<Entry>,
    contents: Vec<Vec<u8>>,
    dirs: Vec<DirRecord>,
    paths: Vec<(AssetPath, Slot)>,
}

impl TreeBuilder {
    /// Creates a builder for the given root directory with default options.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options: BuildOptions::default(),
        }
    }

    /// Replaces the build options.
    #[must_use]
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Walks the root and returns the finished index.
    ///
    /// # Errors
    ///
    /// - [`BuildError::RootNotFound`] / [`BuildError::RootNotDirectory`] for a bad root
    /// - [`BuildError::FileTooLarge`] if any regular file exceeds the ceiling
    /// - [`BuildError::Io`] / [`BuildError::Walk`] for unreadable entries
    /// - [`BuildError::InvalidName`] for names that are not UTF-8
    pub fn build(&self) -> Result<PathIndex, BuildError> {
        let root_meta = fs::metadata(&self.root).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                BuildError::RootNotFound {
                    path: self.root.clone(),
                }
            } else {
                BuildError::Io {
                    path: self.root.clone(),
                    source,
                }
            }
        })?;
        if !root_meta.is_dir() {
            return Err(BuildError::RootNotDirectory {
                path: self.root.clone(),
            });
        }

        let walk = self.walk()?;
        let index = walk.finish();
        tracing::info!(
            root = %self.root.display(),
            files = index.file_count(),
            dirs = index.dir_count(),
            bytes = index.total_bytes(),
            "Built asset index"
        );
        Ok(index)
    }

    fn walk(&self) -> Result<Walk, BuildError> {
        let mut walk = Walk::default();
        // Provisional directory numbers of the current entry's ancestors,
        // indexed by depth.
        let mut ancestors: Vec<usize> = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(self.options.follow_links)
            .sort_by_file_name();

        for item in walker {
            let item = item.map_err(|source| BuildError::Walk {
                path: source
                    .path()
                    .map_or_else(|| self.root.clone(), Path::to_path_buf),
                source,
            })?;
            let path = item.path();
            let depth = item.depth();
            ancestors.truncate(depth);
            let parent = depth.checked_sub(1).and_then(|d| ancestors.get(d).copied());

            let file_type = item.file_type();
            if !file_type.is_dir() && !file_type.is_file() {
                tracing::warn!(path = %path.display(), "Skipping non-regular entry");
                continue;
            }

            let meta = item.metadata().map_err(|source| BuildError::Walk {
                path: path.to_path_buf(),
                source,
            })?;
            let name = entry_name(path, depth, &self.root)?;
            let asset_path = self.asset_path(path)?;
            let mode = mode_bits(&meta);
            let mtime = meta.modified().map_or(0, nanos_from_system_time);

            if file_type.is_dir() {
                tracing::debug!(path = %asset_path, "Visiting directory");
                let id = walk.dirs.len();
                walk.dirs.push(DirRecord {
                    name,
                    mode,
                    mtime,
                    files: Vec::new(),
                    subdirs: Vec::new(),
                });
                if let Some(parent) = parent {
                    walk.dirs[parent].subdirs.push(id);
                }
                walk.paths.push((asset_path, Slot::Dir(id)));
                ancestors.push(id);
            } else {
                if meta.len() > self.options.max_file_size {
                    return Err(BuildError::FileTooLarge {
                        path: path.to_path_buf(),
                        size: meta.len(),
                        limit: self.options.max_file_size,
                    });
                }
                let data = fs::read(path).map_err(|source| BuildError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                tracing::debug!(path = %asset_path, bytes = data.len(), "Embedding file");

                let id = walk.files.len();
                walk.files.push(Entry::file(name, data.len() as u64, mode, mtime));
                walk.contents.push(data);
                if let Some(parent) = parent {
                    walk.dirs[parent].files.push(id);
                }
                walk.paths.push((asset_path, Slot::File(id)));
            }
        }

        Ok(walk)
    }

    fn asset_path(&self, path: &Path) -> Result<AssetPath, BuildError> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let mut segments = Vec::new();
        for component in relative.components() {
            if let Component::Normal(segment) = component {
                segments.push(segment.to_str().ok_or_else(|| BuildError::InvalidName {
                    path: path.to_path_buf(),
                })?);
            }
        }
        Ok(AssetPath::from_segments(segments))
    }
}

impl Walk {
    /// Second phase: shift directory numbers past the files and link children.
    fn finish(self) -> PathIndex {
        let shift = self.files.len();
        let mut entries = self.files;
        entries.reserve(self.dirs.len());
        for dir in self.dirs {
            let children = dir
                .files
                .into_iter()
                .chain(dir.subdirs.into_iter().map(|d| d + shift))
                .map(EntryId::new)
                .collect();
            entries.push(Entry::directory(dir.name, dir.mode, dir.mtime, children));
        }

        let paths: BTreeMap<String, EntryId> = self
            .paths
            .into_iter()
            .map(|(path, slot)| {
                let id = match slot {
                    Slot::File(i) => i,
                    Slot::Dir(i) => i + shift,
                };
                (String::from(path), EntryId::new(id))
            })
            .collect();

        PathIndex::assemble(self.contents, entries, paths)
    }
}

fn entry_name(path: &Path, depth: usize, root: &Path) -> Result<String, BuildError> {
    // The root keeps its own directory name; "." and "/" have none.
    let name = if depth == 0 {
        root.file_name().unwrap_or_else(|| OsStr::new("/"))
    } else {
        path.file_name().unwrap_or_else(|| OsStr::new(""))
    };
    name.to_str()
        .map(str::to_string)
        .ok_or_else(|| BuildError::InvalidName {
            path: path.to_path_buf(),
        })
}

#[cfg(unix)]
pub(crate) fn mode_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    meta.mode()
}

#[cfg(not(unix))]
pub(crate) fn mode_bits(meta: &fs::Metadata) -> u32 {
    match (meta.is_dir(), meta.permissions().readonly()) {
        (true, _) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}
