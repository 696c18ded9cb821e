use std::path::Path;

use tracing::instrument;

use crate::entry::{self, EntryKind};
use crate::error::Error;
use crate::sink::Sink;
use crate::summary::Summary;

/// Removes the directory `path` and everything below it, depth first.
///
/// Only regular files and directories are ever removed. Finding anything else aborts the removal
/// with [`Error::UnsupportedEntryKind`], leaving whatever was not yet deleted in place. Removals
/// that did happen are counted in `summary` even when the call fails.
#[instrument(skip(sink, summary))]
pub fn remove_tree(path: &Path, sink: &dyn Sink, summary: &mut Summary) -> Result<(), Error> {
    for name in entry::list_children(path)? {
        let child = entry::classify(&path.join(name));
        match child.kind {
            EntryKind::Directory => remove_tree(&child.path, sink, summary)?,
            EntryKind::RegularFile => {
                std::fs::remove_file(&child.path).map_err(|source| Error::RemoveFailed {
                    path: child.path.clone(),
                    source,
                })?;
                sink.line(&format!("rm {:?}", &child.path));
                summary.files_removed += 1;
            }
            EntryKind::Other => {
                return Err(Error::UnsupportedEntryKind { path: child.path });
            }
            // vanished in the meantime
            EntryKind::Absent => {}
        }
    }
    std::fs::remove_dir(path).map_err(|source| Error::RemoveFailed {
        path: path.to_owned(),
        source,
    })?;
    sink.line(&format!("rmdir {:?}", path));
    summary.directories_removed += 1;
    Ok(())
}

/// Deletes every entry of `dst_dir` that has no counterpart of a compatible kind in `src_dir`.
///
/// A destination file goes away unless the source has a regular file of the same name; a
/// destination directory goes away unless the source has a directory of the same name, in which
/// case both are descended into. Without `recursive` destination subdirectories are only
/// reported. Destination entries of other kinds are never touched.
#[instrument(skip(sink))]
pub fn remove_extras(src_dir: &Path, dst_dir: &Path, recursive: bool, sink: &dyn Sink) -> Summary {
    let names = match entry::list_children(dst_dir) {
        Ok(names) => names,
        Err(error) => return error.report(sink),
    };
    let mut summary = Summary::default();
    for name in names {
        let dst = entry::classify(&dst_dir.join(&name));
        let src = entry::classify(&src_dir.join(&name));
        match dst.kind {
            EntryKind::Directory if !recursive => {
                sink.line(&format!("not descending into {:?}", &dst.path));
            }
            EntryKind::Directory => {
                if src.kind == EntryKind::Directory {
                    summary += remove_extras(&src.path, &dst.path, true, sink);
                } else {
                    tracing::debug!(
                        "no source directory for {:?} (source is {})",
                        &dst.path,
                        src.kind
                    );
                    let mut rm_summary = Summary::default();
                    if let Err(error) = remove_tree(&dst.path, sink, &mut rm_summary) {
                        rm_summary += error.report(sink);
                    }
                    summary += rm_summary;
                }
            }
            EntryKind::RegularFile => {
                if src.kind == EntryKind::RegularFile {
                    continue;
                }
                tracing::debug!("no source file for {:?} (source is {})", &dst.path, src.kind);
                match std::fs::remove_file(&dst.path) {
                    Ok(()) => {
                        sink.line(&format!("rm {:?}", &dst.path));
                        summary.files_removed += 1;
                    }
                    Err(source) => {
                        summary += Error::RemoveFailed {
                            path: dst.path.clone(),
                            source,
                        }
                        .report(sink);
                    }
                }
            }
            EntryKind::Other => {
                sink.line(&format!("skip {:?}: unsupported entry kind", &dst.path));
                summary.entries_skipped += 1;
            }
            EntryKind::Absent => {}
        }
    }
    summary
}
