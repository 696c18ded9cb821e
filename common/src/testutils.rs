use std::path::Path;

pub fn setup_test_dir() -> tempfile::TempDir {
    // create a temporary directory
    let tmp_dir = tempfile::tempdir().unwrap();
    // foo
    // |- 0.txt
    // |- bar
    //    |- 1.txt
    //    |- 2.txt
    //    |- 3.txt
    // |- baz
    //    |- 4.txt
    //    |- 5.txt -> ../bar/2.txt
    //    |- 6.txt -> (absolute path) .../foo/bar/3.txt
    let foo_path = tmp_dir.path().join("foo");
    std::fs::create_dir(&foo_path).unwrap();
    std::fs::write(foo_path.join("0.txt"), "0").unwrap();
    let bar_path = foo_path.join("bar");
    std::fs::create_dir(&bar_path).unwrap();
    std::fs::write(bar_path.join("1.txt"), "1").unwrap();
    std::fs::write(bar_path.join("2.txt"), "2").unwrap();
    std::fs::write(bar_path.join("3.txt"), "3").unwrap();
    let baz_path = foo_path.join("baz");
    std::fs::create_dir(&baz_path).unwrap();
    std::fs::write(baz_path.join("4.txt"), "4").unwrap();
    std::os::unix::fs::symlink("../bar/2.txt", baz_path.join("5.txt")).unwrap();
    std::os::unix::fs::symlink(bar_path.join("3.txt"), baz_path.join("6.txt")).unwrap();
    tmp_dir
}

pub fn set_mtime(path: &Path, seconds: i64) {
    filetime::set_file_mtime(path, filetime::FileTime::from_unix_time(seconds, 0)).unwrap();
}

/// Asserts every directory and regular file under `src` exists under `dst` with the same kind,
/// content and modification time. Symlinks are not mirrored and must be absent from `dst`.
pub fn check_dirs_mirrored(src: &Path, dst: &Path) {
    for name in crate::entry::list_children(src).unwrap() {
        let src_entry = crate::entry::classify(&src.join(&name));
        let dst_entry = crate::entry::classify(&dst.join(&name));
        match src_entry.kind {
            crate::EntryKind::Directory => {
                assert_eq!(dst_entry.kind, crate::EntryKind::Directory, "{:?}", dst_entry.path);
                check_dirs_mirrored(&src_entry.path, &dst_entry.path);
            }
            crate::EntryKind::RegularFile => {
                assert_eq!(dst_entry.kind, crate::EntryKind::RegularFile, "{:?}", dst_entry.path);
                assert_eq!(
                    std::fs::read(&src_entry.path).unwrap(),
                    std::fs::read(&dst_entry.path).unwrap()
                );
                assert!(src_entry.same_mtime(&dst_entry), "{:?}", dst_entry.path);
            }
            _ => assert_eq!(dst_entry.kind, crate::EntryKind::Absent, "{:?}", dst_entry.path),
        }
    }
}
