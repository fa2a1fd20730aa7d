//! Writing serialized bundles to disk.

use crate::bundle::AssetBundle;
use crate::error::EmitError;
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes `bundle` to `path` atomically.
///
/// The bundle is encoded into a temporary file in the destination directory,
/// synced, made world-readable (`0644` on Unix) and renamed over `path`. A
/// failed write never leaves a partial file at `path`, and parent directories
/// are created as needed.
///
/// # Errors
///
/// Returns [`EmitError`] if the directory cannot be created, encoding or
/// writing fails, or the final rename fails.
///
/// # Examples
///
/// ```
/// use assetfs::{AssetBundle, write_bundle};
/// # use tempfile::TempDir;
///
/// # let temp = TempDir::new().unwrap();
/// let out = temp.path().join("assets.json");
/// write_bundle(&out, &AssetBundle::new()).unwrap();
///
/// let bytes = std::fs::read(&out).unwrap();
/// assert!(AssetBundle::from_slice(&bytes).unwrap().is_empty());
/// ```
pub fn write_bundle(path: impl AsRef<Path>, bundle: &AssetBundle) -> Result<(), EmitError> {
    let path = path.as_ref();
    let io_error = |source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_error)?;

    let temp = NamedTempFile::new_in(dir).map_err(io_error)?;
    let mut writer = BufWriter::new(temp);
    bundle.to_writer(&mut writer)?;
    let temp = writer
        .into_inner()
        .map_err(|e| io_error(e.into_error()))?;
    temp.as_file().sync_all().map_err(io_error)?;
    set_readable(temp.path()).map_err(io_error)?;

    temp.persist(path).map_err(|source| EmitError::Persist {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), bundles = bundle.len(), "Wrote asset bundle");
    Ok(())
}

#[cfg(unix)]
fn set_readable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_readable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
