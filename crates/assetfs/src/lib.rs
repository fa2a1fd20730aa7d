//! Embedded read-only asset filesystems.
//!
//! A build step walks a directory tree once and captures every file's bytes
//! and metadata in a [`PathIndex`]. At runtime a [`VirtualFileSystem`] answers
//! path lookups, byte reads, seeks, stats and directory listings from that
//! index without touching the disk. During development the same queries can
//! be served from disk by a [`DiskFileSystem`]; both implement [`FileSystem`].
//!
//! # Features
//!
//! - **Deterministic builds**: children are visited in name order, so the
//!   same tree always produces the same index
//! - **Stable identities**: files occupy `[0, F)`, directories `[F, F + D)`
//! - **Validated decoding**: every index is checked for consistency on load
//! - **Thread-safe**: indexes and filesystems are `Send + Sync`; each handle
//!   has its own cursor
//!
//! # Examples
//!
//! ## Build and query
//!
//! ```
//! use assetfs::{TreeBuilder, VirtualFileSystem};
//! # use tempfile::TempDir;
//!
//! # let temp = TempDir::new().unwrap();
//! # let root = temp.path();
//! std::fs::write(root.join("red"), "abc").unwrap();
//! std::fs::write(root.join("green"), "cde").unwrap();
//!
//! let index = TreeBuilder::new(root).build().unwrap();
//! let vfs = VirtualFileSystem::new(&index);
//!
//! assert_eq!(vfs.read_file("/red").unwrap(), b"abc");
//! assert!(vfs.resolve("not/a/real/path").unwrap_err().is_not_found());
//! ```
//!
//! ## Multiple directories
//!
//! ```
//! use assetfs::{AssetBundle, BuildOptions, write_bundle};
//! # use tempfile::TempDir;
//!
//! # let temp = TempDir::new().unwrap();
//! # let static_dir = temp.path().join("static");
//! # std::fs::create_dir(&static_dir).unwrap();
//! # std::fs::write(static_dir.join("app.js"), "run()").unwrap();
//! let bundle = AssetBundle::build([&static_dir], &BuildOptions::default()).unwrap();
//!
//! let out = temp.path().join("assets.json");
//! write_bundle(&out, &bundle).unwrap();
//!
//! let loaded = AssetBundle::from_slice(&std::fs::read(&out).unwrap()).unwrap();
//! assert_eq!(loaded, bundle);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod builder;
pub mod bundle;
pub mod disk;
pub mod emit;
pub mod error;
pub mod fs;
pub mod index;
pub mod path;
pub mod types;
pub mod vfs;

// Re-export main types
pub use builder::{BuildOptions, MAX_FILE_SIZE, TreeBuilder};
pub use bundle::{AssetBundle, bundle_name};
pub use disk::{DiskFile, DiskFileSystem};
pub use emit::write_bundle;
pub use error::{BuildError, EmitError, FsError, IndexError, Result};
pub use fs::{File, FileSystem};
pub use index::PathIndex;
pub use path::AssetPath;
pub use types::{Entry, EntryId, EntryKind, FileInfo};
pub use vfs::{Handle, VirtualFileSystem};
