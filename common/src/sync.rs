use std::path::Path;

use tracing::instrument;

use crate::config::SyncRequest;
use crate::copy;
use crate::entry::{self, EntryKind};
use crate::error::Error;
use crate::listing;
use crate::materialize;
use crate::rm;
use crate::sink::Sink;
use crate::summary::Summary;

/// Walks `src_dir` and brings every entry into `dst_dir`: missing entries are created, files
/// whose modification time differs are copied over. Entries whose kind differs between the two
/// sides are skipped and reported as conflicts, this function never deletes anything.
#[instrument(skip(sink))]
pub fn reconcile(
    src_dir: &Path,
    dst_dir: &Path,
    recursive: bool,
    size_threshold: u64,
    sink: &dyn Sink,
) -> Summary {
    let names = match entry::list_children(src_dir) {
        Ok(names) => names,
        Err(error) => return error.report(sink),
    };
    let mut summary = Summary::default();
    for name in names {
        let src = entry::classify(&src_dir.join(&name));
        let dst_path = dst_dir.join(&name);
        if let Some(line) = listing::describe(&src) {
            sink.line(&line);
        }
        match src.kind {
            EntryKind::Directory if !recursive => {
                sink.line(&format!("not descending into {:?}", &src.path));
            }
            EntryKind::Directory => {
                let dst = entry::classify(&dst_path);
                match dst.kind {
                    EntryKind::Directory => {
                        sink.line(&format!("exists {:?}", &dst.path));
                        summary.directories_unchanged += 1;
                        summary += reconcile(&src.path, &dst.path, true, size_threshold, sink);
                    }
                    EntryKind::Absent => {
                        summary += materialize::materialize(
                            &src.path,
                            &dst.path,
                            size_threshold,
                            sink,
                        );
                    }
                    EntryKind::RegularFile | EntryKind::Other => {
                        sink.line(&format!(
                            "conflict {:?}: source is a directory, destination is {}, skipping",
                            &dst.path, dst.kind
                        ));
                        summary.entries_skipped += 1;
                    }
                }
            }
            EntryKind::RegularFile => {
                let dst = entry::classify(&dst_path);
                match dst.kind {
                    EntryKind::RegularFile if src.same_mtime(&dst) => {
                        sink.line(&format!("in sync {:?}", &dst.path));
                        summary.files_unchanged += 1;
                    }
                    EntryKind::RegularFile | EntryKind::Absent => {
                        summary += copy::mirror_file(&src, &dst.path, size_threshold, sink);
                    }
                    EntryKind::Directory | EntryKind::Other => {
                        sink.line(&format!(
                            "conflict {:?}: source is a file, destination is {}, skipping",
                            &dst.path, dst.kind
                        ));
                        summary.entries_skipped += 1;
                    }
                }
            }
            EntryKind::Other => {
                sink.line(&format!("skip {:?}: unsupported entry kind", &src.path));
                summary.entries_skipped += 1;
            }
            // vanished in the meantime
            EntryKind::Absent => {}
        }
    }
    summary
}

/// Runs one mirror pass: first the destination is cleared of extras, then the source is
/// reconciled into it.
///
/// Per entry failures are narrated and counted in the returned summary. The pass as a whole
/// only fails when one of the roots cannot be opened, in which case nothing is touched.
#[instrument(skip(sink))]
pub fn synchronize(request: &SyncRequest, sink: &dyn Sink) -> Result<Summary, Error> {
    let source_root = request.source_root();
    let dest_root = request.dest_root();
    for root in [source_root, dest_root] {
        std::fs::read_dir(root).map_err(|source| Error::DirectoryOpenFailed {
            path: root.to_owned(),
            source,
        })?;
    }
    sink.line(&format!(
        "sync {:?} -> {:?} (recursive: {}, size threshold: {})",
        source_root,
        dest_root,
        request.recursive(),
        bytesize::ByteSize(request.size_threshold())
    ));
    let summary = rm::remove_extras(source_root, dest_root, request.recursive(), sink)
        + reconcile(
            source_root,
            dest_root,
            request.recursive(),
            request.size_threshold(),
            sink,
        );
    sink.line(&format!(
        "sync done: {} copied, {} created, {} removed, {} unchanged, {} errors",
        summary.files_copied,
        summary.directories_created,
        summary.files_removed + summary.directories_removed,
        summary.files_unchanged + summary.directories_unchanged,
        summary.errors
    ));
    Ok(summary)
}
