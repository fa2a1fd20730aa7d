//! Cat command implementation.

use super::load_bundle;
use anyhow::{Context, Result, bail};
use std::io::{self, Write};
use std::path::Path;

/// Copies the file at `path` in bundle `name` to `out`.
///
/// # Errors
///
/// Returns an error if the bundle cannot be loaded, the path does not exist,
/// or it names a directory.
pub fn run(bundle: &Path, name: &str, path: &str, out: &mut impl Write) -> Result<()> {
    let bundle = load_bundle(bundle)?;
    let vfs = bundle.filesystem(name);
    if vfs.is_absent() {
        bail!("no bundle named {name:?}");
    }

    let mut handle = vfs.open(path)?;
    io::copy(&mut handle, out).with_context(|| format!("failed to copy {path}"))?;
    Ok(())
}
