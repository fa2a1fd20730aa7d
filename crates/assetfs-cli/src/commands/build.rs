//! Build command implementation.
//!
//! Walks each asset directory and writes the combined bundle atomically.

use anyhow::{Context, Result};
use assetfs::{AssetBundle, BuildOptions, write_bundle};
use std::path::{Path, PathBuf};
use tracing::info;

/// Runs the build command.
///
/// # Errors
///
/// Returns an error if any directory fails to build or the bundle cannot be
/// written. Nothing is written in either case.
pub fn run(dirs: &[PathBuf], out: &Path, options: &BuildOptions) -> Result<()> {
    info!(
        dirs = dirs.len(),
        max_file_size = options.max_file_size,
        follow_links = options.follow_links,
        "Building asset bundle"
    );

    let bundle = AssetBundle::build(dirs, options).context("failed to build asset bundle")?;
    for (name, index) in bundle.iter() {
        info!(
            bundle = name,
            files = index.file_count(),
            dirs = index.dir_count(),
            bytes = index.total_bytes(),
            "Embedded directory"
        );
    }

    write_bundle(out, &bundle).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}
