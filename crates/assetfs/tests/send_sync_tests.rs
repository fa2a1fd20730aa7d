//! Tests to verify that public types are Send + Sync where required.

use assetfs::*;

const fn assert_send_sync<T: Send + Sync>() {}
const fn assert_send<T: Send>() {}

#[test]
fn test_index_types_are_send_sync() {
    // Indexes are shared read-only across threads
    assert_send_sync::<PathIndex>();
    assert_send_sync::<AssetBundle>();
    assert_send_sync::<Entry>();
    assert_send_sync::<EntryId>();
    assert_send_sync::<AssetPath>();
}

#[test]
fn test_filesystems_are_send_sync() {
    assert_send_sync::<VirtualFileSystem<'static>>();
    assert_send_sync::<DiskFileSystem>();
}

#[test]
fn test_handles_are_send() {
    // Handles carry a private cursor and move between threads
    assert_send::<Handle<'static>>();
    assert_send::<DiskFile>();
    assert_send_sync::<FileInfo>();
}

#[test]
fn test_errors_are_send_sync() {
    assert_send_sync::<FsError>();
    assert_send_sync::<BuildError>();
    assert_send_sync::<IndexError>();
    assert_send_sync::<EmitError>();
}

#[test]
fn test_concurrent_readers_share_one_index() {
    let temp = tempfile::TempDir::new().unwrap();
    for i in 0..8 {
        std::fs::write(temp.path().join(format!("f{i}")), format!("body {i}")).unwrap();
    }
    let index = TreeBuilder::new(temp.path()).build().unwrap();
    let vfs = VirtualFileSystem::new(&index);

    std::thread::scope(|scope| {
        for i in 0..8 {
            scope.spawn(move || {
                let mut handle = vfs.open(&format!("/f{i}")).unwrap();
                let mut body = String::new();
                std::io::Read::read_to_string(&mut handle, &mut body).unwrap();
                assert_eq!(body, format!("body {i}"));

                let mut root = vfs.open("/").unwrap();
                assert_eq!(root.read_dir(0).unwrap().len(), 8);
            });
        }
    });
}
