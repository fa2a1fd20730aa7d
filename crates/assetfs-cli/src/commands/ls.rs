//! Ls command implementation.
//!
//! Lists a directory inside a bundle, or prints a single entry when the path
//! names a file.

use super::load_bundle;
use crate::OutputFormat;
use anyhow::{Result, bail};
use assetfs::FileInfo;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// One listed entry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ListEntry {
    /// Base name
    pub name: String,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Permission bits in octal
    pub mode: String,
    /// Modification time in seconds since the Unix epoch
    pub modified: u64,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

impl From<&FileInfo> for ListEntry {
    fn from(info: &FileInfo) -> Self {
        Self {
            name: info.name().to_string(),
            size: info.len(),
            mode: format!("{:04o}", info.mode() & 0o7777),
            modified: info
                .modified()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs()),
            is_dir: info.is_dir(),
        }
    }
}

/// Runs the ls command.
///
/// With `color` set, directory names in text output are highlighted.
///
/// # Errors
///
/// Returns an error if the bundle cannot be loaded or the path does not
/// exist.
pub fn run(
    bundle: &Path,
    name: &str,
    path: &str,
    format: OutputFormat,
    color: bool,
    out: &mut impl Write,
) -> Result<()> {
    let bundle = load_bundle(bundle)?;
    let vfs = bundle.filesystem(name);
    if vfs.is_absent() {
        bail!("no bundle named {name:?}");
    }

    let mut handle = vfs.open(path)?;
    let infos = if handle.entry().is_dir() {
        handle.read_dir(0)?
    } else {
        vec![handle.stat()]
    };
    let entries: Vec<ListEntry> = infos.iter().map(ListEntry::from).collect();

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &entries)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for entry in &entries {
                let (kind, label) = if entry.is_dir {
                    let label = format!("{}/", entry.name);
                    let label = if color {
                        label.blue().bold().to_string()
                    } else {
                        label
                    };
                    ('d', label)
                } else {
                    ('-', entry.name.clone())
                };
                writeln!(out, "{kind} {} {:>10} {label}", entry.mode, entry.size)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetfs::{AssetBundle, BuildOptions, write_bundle};
    use std::fs;
    use tempfile::TempDir;

    fn fixture(temp: &TempDir) -> (std::path::PathBuf, String) {
        let dir = temp.path().join("static");
        fs::create_dir_all(dir.join("css")).unwrap();
        fs::write(dir.join("index.html"), "<html></html>").unwrap();
        fs::write(dir.join("css/site.css"), "body {}").unwrap();
        let bundle = AssetBundle::build([&dir], &BuildOptions::default()).unwrap();
        let out = temp.path().join("assets.json");
        write_bundle(&out, &bundle).unwrap();
        (out, assetfs::bundle_name(&dir))
    }

    #[test]
    fn test_ls_text_lists_files_then_dirs() {
        let temp = TempDir::new().unwrap();
        let (bundle, name) = fixture(&temp);

        let mut out = Vec::new();
        run(&bundle, &name, "/", OutputFormat::Text, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('-'));
        assert!(lines[0].ends_with(" index.html"));
        assert!(lines[1].starts_with('d'));
        assert!(lines[1].ends_with(" css/"));
    }

    #[test]
    fn test_ls_json() {
        let temp = TempDir::new().unwrap();
        let (bundle, name) = fixture(&temp);

        let mut out = Vec::new();
        run(&bundle, &name, "css", OutputFormat::Json, false, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value[0]["name"], "site.css");
        assert_eq!(value[0]["size"], 7);
        assert_eq!(value[0]["is_dir"], false);
    }

    #[test]
    fn test_ls_file_prints_single_entry() {
        let temp = TempDir::new().unwrap();
        let (bundle, name) = fixture(&temp);

        let mut out = Vec::new();
        run(&bundle, &name, "/index.html", OutputFormat::Text, false, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_ls_missing_path() {
        let temp = TempDir::new().unwrap();
        let (bundle, name) = fixture(&temp);

        let mut out = Vec::new();
        assert!(run(&bundle, &name, "/missing", OutputFormat::Text, false, &mut out).is_err());
        assert!(run(&bundle, "unknown", "/", OutputFormat::Text, false, &mut out).is_err());
    }

    #[test]
    fn test_ls_color_highlights_directories() {
        colored::control::set_override(true);
        let temp = TempDir::new().unwrap();
        let (bundle, name) = fixture(&temp);

        let mut out = Vec::new();
        run(&bundle, &name, "/", OutputFormat::Text, true, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\u{1b}["), "{text:?}");
        assert!(text.lines().next().unwrap().ends_with(" index.html"));
    }

    #[test]
    fn test_list_entry_mode_is_octal() {
        let info = assetfs::Entry::file("a", 1, 0o100_644, 0).info();
        let entry = ListEntry::from(&info);
        assert_eq!(entry.mode, "0644");
        assert!(!entry.is_dir);
    }
}
