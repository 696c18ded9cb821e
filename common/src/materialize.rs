use std::path::Path;

use tracing::instrument;

use crate::copy;
use crate::entry::{self, EntryKind};
use crate::error::Error;
use crate::sink::Sink;
use crate::summary::Summary;

/// Recreates the tree rooted at `src_dir` at `dst_dir`, which must not exist yet.
///
/// If `dst_dir` cannot be created nothing below it is attempted. Entries that are neither
/// regular files nor directories are skipped without a word.
#[instrument(skip(sink))]
pub fn materialize(
    src_dir: &Path,
    dst_dir: &Path,
    size_threshold: u64,
    sink: &dyn Sink,
) -> Summary {
    if let Err(source) = std::fs::create_dir(dst_dir) {
        return Error::DirectoryCreateFailed {
            path: dst_dir.to_owned(),
            source,
        }
        .report(sink);
    }
    sink.line(&format!("mkdir {:?}", dst_dir));
    let mut summary = Summary {
        directories_created: 1,
        ..Default::default()
    };
    let names = match entry::list_children(src_dir) {
        Ok(names) => names,
        Err(error) => return summary + error.report(sink),
    };
    for name in names {
        let src = entry::classify(&src_dir.join(&name));
        let dst = dst_dir.join(&name);
        match src.kind {
            EntryKind::Directory => {
                summary += materialize(&src.path, &dst, size_threshold, sink);
            }
            EntryKind::RegularFile => {
                summary += copy::mirror_file(&src, &dst, size_threshold, sink);
            }
            EntryKind::Other | EntryKind::Absent => {
                tracing::trace!("skipping {:?} ({})", &src.path, src.kind);
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::testutils;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn creates_full_subtree() {
        let tmp_dir = testutils::setup_test_dir();
        let src = tmp_dir.path().join("foo");
        let dst = tmp_dir.path().join("copy");
        let sink = MemorySink::new();
        let summary = materialize(&src, &dst, 1_000_000, &sink);
        assert_eq!(summary.directories_created, 3);
        assert_eq!(summary.files_copied, 5);
        assert_eq!(summary.errors, 0);
        testutils::check_dirs_mirrored(&src, &dst);
        // symlinks are skipped silently
        assert!(!dst.join("baz").join("5.txt").exists());
        assert!(sink.matching("5.txt").is_empty());
        assert!(sink.matching("error").is_empty());
    }

    #[test]
    fn existing_destination_is_not_entered() {
        let tmp_dir = testutils::setup_test_dir();
        let src = tmp_dir.path().join("foo");
        let dst = tmp_dir.path().join("taken");
        std::fs::write(&dst, "a file is in the way").unwrap();
        let sink = MemorySink::new();
        let summary = materialize(&src, &dst, 1_000_000, &sink);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.directories_created, 0);
        assert_eq!(summary.files_copied, 0);
        assert_eq!(sink.matching("cannot create directory").len(), 1);
        assert_eq!(
            std::fs::read_to_string(&dst).unwrap(),
            "a file is in the way"
        );
    }

    #[test]
    fn large_files_are_memory_mapped() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let src = tmp_dir.path().join("src");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(src.join("small"), "1234").unwrap();
        std::fs::write(src.join("large"), "12345").unwrap();
        let sink = MemorySink::new();
        let dst = tmp_dir.path().join("dst");
        let summary = materialize(&src, &dst, 4, &sink);
        assert_eq!(summary.files_copied, 2);
        assert_eq!(summary.bytes_copied, 9);
        assert_eq!(sink.matching("(mmap, ").len(), 1);
        assert_eq!(sink.matching("(stream, ").len(), 1);
        assert_eq!(std::fs::read_to_string(dst.join("large")).unwrap(), "12345");
    }
}
