//! Command implementations for the assetfs CLI.
//!
//! Each command module parses nothing itself: it receives typed arguments
//! from `main`, performs the operation and writes its output to the given
//! writer.

pub mod build;
pub mod cat;
pub mod completions;
pub mod ls;

use anyhow::{Context, Result};
use assetfs::AssetBundle;
use std::fs;
use std::path::Path;

/// Reads and validates a bundle file.
pub fn load_bundle(path: &Path) -> Result<AssetBundle> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read bundle {}", path.display()))?;
    let bundle = AssetBundle::from_slice(&bytes)
        .with_context(|| format!("invalid bundle {}", path.display()))?;
    tracing::debug!(path = %path.display(), bundles = bundle.len(), "Loaded bundle");
    Ok(bundle)
}
