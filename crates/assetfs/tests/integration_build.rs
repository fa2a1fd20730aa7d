//! Integration tests for the build-then-query workflow.
//!
//! Each test lays out a real directory tree, builds an index from it and
//! queries the result through the public API only.

use assetfs::{
    AssetBundle, BuildError, BuildOptions, DiskFileSystem, File, FileInfo, FileSystem, FsError,
    IndexError, PathIndex, TreeBuilder, VirtualFileSystem, write_bundle,
};
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, data: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, data).unwrap();
}

/// A small site: two top-level files, a stylesheet directory and an empty
/// directory.
fn site() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "index.html", b"<html></html>");
    write(temp.path(), "robots.txt", b"User-agent: *");
    write(temp.path(), "css/site.css", b"body {}");
    write(temp.path(), "css/print.css", b"@media print {}");
    fs::create_dir(temp.path().join("empty")).unwrap();
    temp
}

fn names(infos: &[FileInfo]) -> Vec<String> {
    infos.iter().map(|i| i.name().to_string()).collect()
}

/// Test the red/green scenario end to end
#[test]
fn test_red_green_round_trip() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("static");
    write(&root, "red", b"abc");
    write(&root, "green", b"cde");

    let index = TreeBuilder::new(&root).build().unwrap();
    let vfs = VirtualFileSystem::new(&index);

    let mut red = vfs.open("/red").unwrap();
    let mut buf = [0u8; 3];
    assert_eq!(red.read(&mut buf).unwrap(), 3);
    assert_eq!(&buf, b"abc");

    let mut root_dir = vfs.open("/").unwrap();
    let listing = root_dir.read_dir(0).unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(names(&listing), ["green", "red"]);
    assert_eq!(root_dir.stat().name(), "static");

    assert!(matches!(
        vfs.resolve("not/a/real/path"),
        Err(FsError::NotFound { .. })
    ));
}

/// Test that an oversized file aborts the build and is named in the error
#[test]
fn test_oversized_file_aborts_build() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "small.txt", b"ok");
    let big = temp.path().join("big.bin");
    let file = fs::File::create(&big).unwrap();
    file.set_len(11 << 20).unwrap();

    let err = TreeBuilder::new(temp.path()).build().unwrap_err();
    assert!(err.is_too_large());
    assert!(err.to_string().contains("big.bin"), "{err}");
    match err {
        BuildError::FileTooLarge { path, size, limit } => {
            assert_eq!(path, big);
            assert_eq!(size, 11 << 20);
            assert_eq!(limit, 10 << 20);
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Test that a file exactly at the ceiling is accepted
#[test]
fn test_file_at_ceiling_is_accepted() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "exact.bin", &[7u8; 64]);

    let options = BuildOptions::new().with_max_file_size(64);
    let index = TreeBuilder::new(temp.path())
        .with_options(options)
        .build()
        .unwrap();
    assert_eq!(index.total_bytes(), 64);
}

/// Test building an empty root directory
#[test]
fn test_empty_root() {
    let temp = TempDir::new().unwrap();
    let index = TreeBuilder::new(temp.path()).build().unwrap();

    assert_eq!(index.file_count(), 0);
    assert_eq!(index.dir_count(), 1);
    assert_eq!(index.len(), 1);

    let vfs = VirtualFileSystem::new(&index);
    let mut root = vfs.open("/").unwrap();
    assert!(root.read_dir(0).unwrap().is_empty());
    assert!(root.read_dir(1).unwrap_err().is_end_of_stream());
}

/// Test that identities follow the files-then-directories layout
#[test]
fn test_identity_ranges() {
    let temp = site();
    let index = TreeBuilder::new(temp.path()).build().unwrap();
    let files = index.file_count();

    assert_eq!(files, 4);
    assert_eq!(index.dir_count(), 3);
    for (path, id) in index.paths() {
        let entry = index.entry(id).unwrap();
        assert_eq!(entry.is_dir(), id.index() >= files, "{path}");
        assert_eq!(index.content(id).is_some(), !entry.is_dir(), "{path}");
    }
}

/// Test that every built entry carries the metadata of its source
#[test]
fn test_built_metadata_matches_source() {
    let temp = site();
    let index = TreeBuilder::new(temp.path()).build().unwrap();
    assert_eq!(index.len(), 7);

    for (path, id) in index.paths() {
        let entry = index.entry(id).unwrap();
        let source = temp.path().join(path.trim_start_matches('/'));
        let meta = fs::metadata(&source).unwrap();

        let expected_name = source.file_name().unwrap().to_str().unwrap();
        assert_eq!(entry.name(), expected_name, "{path}");
        assert_eq!(entry.is_dir(), meta.is_dir(), "{path}");
        let expected_size = if meta.is_dir() { 0 } else { meta.len() };
        assert_eq!(entry.size(), expected_size, "{path}");

        let modified = meta.modified().unwrap();
        let nanos = modified.duration_since(UNIX_EPOCH).unwrap().as_nanos();
        assert_eq!(entry.mtime_nanos(), i64::try_from(nanos).unwrap(), "{path}");
        assert_eq!(entry.modified(), modified, "{path}");
        assert_eq!(entry.info().modified(), modified, "{path}");

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            assert_eq!(entry.mode(), meta.mode(), "{path}");
        }
    }
}

/// Test that an unreadable file aborts the build and is named in the error
#[cfg(unix)]
#[test]
fn test_unreadable_file_aborts_build() {
    use std::os::unix::fs::PermissionsExt;

    let temp = site();
    let locked = temp.path().join("css/site.css");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    let unreadable = fs::read(&locked).is_err();

    let result = TreeBuilder::new(temp.path()).build();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
    // Permission bits do not stop a privileged user.
    if !unreadable {
        return;
    }

    match result.unwrap_err() {
        BuildError::Io { path, source } => {
            assert_eq!(path, locked);
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Test that an unreadable directory aborts the build and is named in the error
#[cfg(unix)]
#[test]
fn test_unreadable_directory_aborts_build() {
    use std::os::unix::fs::PermissionsExt;

    let temp = site();
    let locked = temp.path().join("css");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    let unreadable = fs::read_dir(&locked).is_err();

    let result = TreeBuilder::new(temp.path()).build();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    if !unreadable {
        return;
    }

    let err = result.unwrap_err();
    assert!(err.to_string().contains("css"), "{err}");
    match err {
        BuildError::Walk { path, .. } => assert_eq!(path, locked),
        other => panic!("unexpected error: {other}"),
    }
}

/// Test that rebuilding an unchanged tree produces identical output
#[test]
fn test_rebuild_is_deterministic() {
    let temp = site();
    let first = TreeBuilder::new(temp.path()).build().unwrap();
    let second = TreeBuilder::new(temp.path()).build().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_vec().unwrap(), second.to_vec().unwrap());
}

/// Test that bounded batches concatenate to the unbounded listing
#[test]
fn test_bounded_batches_concatenate() {
    let temp = site();
    let index = TreeBuilder::new(temp.path()).build().unwrap();
    let vfs = VirtualFileSystem::new(&index);

    let all = vfs.open("/").unwrap().read_dir(0).unwrap();
    assert_eq!(names(&all), ["index.html", "robots.txt", "css", "empty"]);

    for batch_size in 1..=5 {
        let mut dir = vfs.open("/").unwrap();
        let mut collected = Vec::new();
        loop {
            match dir.read_dir(batch_size) {
                Ok(batch) => {
                    assert!(!batch.is_empty());
                    assert!(batch.len() <= batch_size);
                    collected.extend(batch);
                }
                Err(err) => {
                    assert!(err.is_end_of_stream());
                    break;
                }
            }
        }
        assert_eq!(collected, all, "batch size {batch_size}");
    }
}

/// Test seeking and partial reads through the std traits
#[test]
fn test_seek_and_read_through_std_traits() {
    let temp = site();
    let index = TreeBuilder::new(temp.path()).build().unwrap();
    let vfs = VirtualFileSystem::new(&index);

    let mut file = FileSystem::open(&vfs, "css/print.css").unwrap();
    Seek::seek(&mut file, SeekFrom::Start(7)).unwrap();
    let mut rest = String::new();
    Read::read_to_string(&mut file, &mut rest).unwrap();
    assert_eq!(rest, "print {}");
}

/// Generic consumer used to check both implementations behave the same.
fn snapshot<F: FileSystem>(fs: &F, path: &str) -> (FileInfo, Option<Vec<u8>>, Vec<String>) {
    let mut handle = fs.open(path).unwrap();
    let info = handle.stat().unwrap();
    if info.is_dir() {
        let listing = names(&handle.read_dir(0).unwrap());
        (info, None, listing)
    } else {
        let mut body = Vec::new();
        handle.read_to_end(&mut body).unwrap();
        (info, Some(body), Vec::new())
    }
}

/// Test that the disk filesystem and the embedded one agree
#[test]
fn test_disk_and_embedded_agree() {
    let temp = site();
    let index = TreeBuilder::new(temp.path()).build().unwrap();
    let embedded = VirtualFileSystem::new(&index);
    let disk = DiskFileSystem::new(temp.path());

    for path in ["/", "/css", "/empty", "/index.html", "css/../robots.txt"] {
        let (a_info, a_body, a_list) = snapshot(&embedded, path);
        let (b_info, b_body, b_list) = snapshot(&disk, path);

        assert_eq!(a_info.len(), b_info.len(), "{path}");
        assert_eq!(a_info.is_dir(), b_info.is_dir(), "{path}");
        assert_eq!(a_info.mode(), b_info.mode(), "{path}");
        assert_eq!(a_body, b_body, "{path}");
        assert_eq!(a_list, b_list, "{path}");
    }

    assert!(disk.open("missing").unwrap_err().is_not_found());
    assert!(embedded.open("missing").unwrap_err().is_not_found());
}

/// Test the multi-directory bundle through disk and back
#[test]
fn test_bundle_written_and_reloaded() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "static/app.js", b"run()");
    write(temp.path(), "templates/base.html", b"<main></main>");
    let dirs = [temp.path().join("static"), temp.path().join("templates")];

    let bundle = AssetBundle::build(&dirs, &BuildOptions::default()).unwrap();
    let out = temp.path().join("build/assets.json");
    write_bundle(&out, &bundle).unwrap();

    let loaded = AssetBundle::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(loaded.len(), 2);

    let name = assetfs::bundle_name(&dirs[1]);
    let vfs = loaded.filesystem(&name);
    assert_eq!(vfs.read_file("base.html").unwrap(), b"<main></main>");
    assert!(loaded.filesystem("nope").resolve("/").unwrap_err().is_not_found());
}

/// Test that a tampered bundle is rejected on load
#[test]
fn test_tampered_index_rejected() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "red", b"abc");
    let index = TreeBuilder::new(temp.path()).build().unwrap();

    let json = String::from_utf8(index.to_vec().unwrap()).unwrap();
    let tampered = json.replace("\"size\":3", "\"size\":4");
    assert_ne!(json, tampered);

    let err = PathIndex::from_slice(tampered.as_bytes()).unwrap_err();
    assert!(matches!(err, IndexError::Inconsistent { .. }), "{err}");
    assert!(err.to_string().contains("size 4 but 3 bytes"), "{err}");
}

/// Test that a missing root is reported before walking
#[test]
fn test_missing_root() {
    let temp = TempDir::new().unwrap();
    let err = TreeBuilder::new(temp.path().join("nope")).build().unwrap_err();
    assert!(matches!(err, BuildError::RootNotFound { .. }));
}
