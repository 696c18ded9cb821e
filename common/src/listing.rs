//! Read-only listing of a tree, one `D:`/`F:` line per entry.

use std::path::Path;

use crate::entry::{self, Entry, EntryKind};
use crate::error::Error;
use crate::sink::Sink;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Formats a modification time in local time, e.g. `2024/03/01 17:05:09`.
pub fn format_mtime(mtime: i64, mtime_nsec: i64) -> String {
    let nsec = u32::try_from(mtime_nsec).unwrap_or(0);
    match chrono::DateTime::from_timestamp(mtime, nsec) {
        Some(utc) => utc
            .with_timezone(&chrono::Local)
            .format(TIMESTAMP_FORMAT)
            .to_string(),
        None => format!("@{mtime}"),
    }
}

/// The classification line for an entry, `None` for kinds that are never listed.
pub fn describe(entry: &Entry) -> Option<String> {
    let tag = match entry.kind {
        EntryKind::Directory => "D",
        EntryKind::RegularFile => "F",
        EntryKind::Absent | EntryKind::Other => return None,
    };
    Some(format!(
        "{}: {} {:?}",
        tag,
        format_mtime(entry.mtime, entry.mtime_nsec),
        entry.path
    ))
}

/// Narrates every directory and regular file under `root`, returns the number of lines emitted.
///
/// Subdirectories are listed but only descended into when `recursive` is set. A subdirectory
/// that cannot be opened is narrated and skipped; only failing to open `root` is an error.
pub fn list_tree(root: &Path, recursive: bool, sink: &dyn Sink) -> Result<usize, Error> {
    let names = entry::list_children(root)?;
    let mut listed = 0;
    for name in names {
        let child = entry::classify(&root.join(name));
        let Some(line) = describe(&child) else {
            continue;
        };
        sink.line(&line);
        listed += 1;
        if recursive && child.kind == EntryKind::Directory {
            match list_tree(&child.path, true, sink) {
                Ok(count) => listed += count,
                Err(error) => sink.line(&format!("error: {error}")),
            }
        }
    }
    Ok(listed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::testutils;

    #[test]
    fn line_format() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let file = tmp_dir.path().join("0.txt");
        std::fs::write(&file, "0").unwrap();
        let line = describe(&entry::classify(&file)).unwrap();
        assert!(line.starts_with("F: "));
        assert!(line.ends_with(&format!("{:?}", file)));
        // "F: YYYY/MM/DD HH:MM:SS " prefix
        let timestamp = &line[3..22];
        assert!(chrono::NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok());
        assert!(describe(&entry::classify(&tmp_dir.path().join("missing"))).is_none());
    }

    #[test]
    fn recursive_listing_covers_whole_tree() {
        let tmp_dir = testutils::setup_test_dir();
        let foo = tmp_dir.path().join("foo");
        let sink = MemorySink::new();
        // 0.txt, bar, bar/{1,2,3}.txt, baz, baz/4.txt
        assert_eq!(list_tree(&foo, true, &sink).unwrap(), 7);
        assert_eq!(sink.matching("D: ").len(), 2);
        assert_eq!(sink.matching("F: ").len(), 5);
        // the symlinks in baz are never listed
        assert!(sink.matching("5.txt").is_empty());
    }

    #[test]
    fn flat_listing_reports_directories_without_descending() {
        let tmp_dir = testutils::setup_test_dir();
        let sink = MemorySink::new();
        assert_eq!(list_tree(&tmp_dir.path().join("foo"), false, &sink).unwrap(), 3);
        assert!(sink.matching("1.txt").is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();
        assert!(matches!(
            list_tree(&tmp_dir.path().join("missing"), true, &sink),
            Err(Error::DirectoryOpenFailed { .. })
        ));
    }
}
