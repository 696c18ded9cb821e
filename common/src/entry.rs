use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use crate::error::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Absent,
    RegularFile,
    Directory,
    /// Anything else: symlinks, sockets, fifos, devices.
    Other,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            EntryKind::Absent => "absent",
            EntryKind::RegularFile => "file",
            EntryKind::Directory => "directory",
            EntryKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// A filesystem object as observed at one point of the traversal. Never cached.
#[derive(Clone, Debug)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Size in bytes, only meaningful for regular files.
    pub size: u64,
    pub mtime: i64,
    pub mtime_nsec: i64,
}

impl Entry {
    fn absent(path: &Path) -> Self {
        Self {
            path: path.to_owned(),
            kind: EntryKind::Absent,
            size: 0,
            mtime: 0,
            mtime_nsec: 0,
        }
    }

    /// Modification times are equal at the resolution both sides expose.
    pub fn same_mtime(&self, other: &Entry) -> bool {
        if self.mtime != other.mtime {
            return false;
        }
        // some filesystems do not support nanosecond precision, only compare nanoseconds if both
        // files have them
        self.mtime_nsec == 0 || other.mtime_nsec == 0 || self.mtime_nsec == other.mtime_nsec
    }
}

/// Reads metadata of `path` without following symlinks.
///
/// Lookup failures of any kind are folded into [`EntryKind::Absent`]; callers cannot tell
/// "permission denied" from "does not exist".
pub fn classify(path: &Path) -> Entry {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) => {
            tracing::trace!("metadata lookup for {:?} failed: {}", path, &error);
            return Entry::absent(path);
        }
    };
    let file_type = metadata.file_type();
    let kind = if file_type.is_file() {
        EntryKind::RegularFile
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::Other
    };
    Entry {
        path: path.to_owned(),
        kind,
        size: if kind == EntryKind::RegularFile {
            metadata.size()
        } else {
            0
        },
        mtime: metadata.mtime(),
        mtime_nsec: metadata.mtime_nsec(),
    }
}

/// Names of all entries in `dir`, sorted.
pub fn list_children(dir: &Path) -> Result<Vec<std::ffi::OsString>, Error> {
    let open_failed = |source| Error::DirectoryOpenFailed {
        path: dir.to_owned(),
        source,
    };
    let mut names = std::fs::read_dir(dir)
        .map_err(open_failed)?
        .map(|entry| entry.map(|entry| entry.file_name()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(open_failed)?;
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_basic_kinds() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let file = tmp_dir.path().join("0.txt");
        std::fs::write(&file, "hello").unwrap();
        let dir = tmp_dir.path().join("bar");
        std::fs::create_dir(&dir).unwrap();
        let link = tmp_dir.path().join("link");
        std::os::unix::fs::symlink(&file, &link).unwrap();

        let entry = classify(&file);
        assert_eq!(entry.kind, EntryKind::RegularFile);
        assert_eq!(entry.size, 5);
        assert_eq!(classify(&dir).kind, EntryKind::Directory);
        assert_eq!(classify(&dir).size, 0);
        assert_eq!(classify(&link).kind, EntryKind::Other);
        assert_eq!(classify(&tmp_dir.path().join("missing")).kind, EntryKind::Absent);
    }

    #[test]
    fn dangling_symlink_is_not_followed() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let link = tmp_dir.path().join("dangling");
        std::os::unix::fs::symlink(tmp_dir.path().join("nowhere"), &link).unwrap();
        assert_eq!(classify(&link).kind, EntryKind::Other);
    }

    #[test]
    fn mtime_comparison() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let a = tmp_dir.path().join("a");
        let b = tmp_dir.path().join("b");
        std::fs::write(&a, "a").unwrap();
        std::fs::write(&b, "b").unwrap();
        filetime::set_file_mtime(&a, filetime::FileTime::from_unix_time(100, 0)).unwrap();
        filetime::set_file_mtime(&b, filetime::FileTime::from_unix_time(100, 0)).unwrap();
        assert!(classify(&a).same_mtime(&classify(&b)));
        filetime::set_file_mtime(&b, filetime::FileTime::from_unix_time(50, 0)).unwrap();
        assert!(!classify(&a).same_mtime(&classify(&b)));
    }

    #[test]
    fn nanoseconds_only_compared_when_both_present() {
        let entry = |mtime, mtime_nsec| Entry {
            path: PathBuf::from("x"),
            kind: EntryKind::RegularFile,
            size: 0,
            mtime,
            mtime_nsec,
        };
        assert!(entry(100, 0).same_mtime(&entry(100, 500)));
        assert!(entry(100, 500).same_mtime(&entry(100, 500)));
        assert!(!entry(100, 400).same_mtime(&entry(100, 500)));
        assert!(!entry(101, 0).same_mtime(&entry(100, 0)));
    }

    #[test]
    fn children_are_sorted() {
        let tmp_dir = tempfile::tempdir().unwrap();
        for name in ["c", "a", "b"] {
            std::fs::write(tmp_dir.path().join(name), name).unwrap();
        }
        let names = list_children(tmp_dir.path()).unwrap();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn listing_missing_directory_fails() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let missing = tmp_dir.path().join("missing");
        match list_children(&missing) {
            Err(Error::DirectoryOpenFailed { path, .. }) => assert_eq!(path, missing),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
