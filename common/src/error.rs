//! Error taxonomy of the mirroring core
//!
//! Every variant names the path it failed on. None of these abort a pass on their own: the
//! walkers narrate the error, count it and move on to the next sibling. The only exception is
//! [`Error::DirectoryOpenFailed`] on one of the two roots, which makes
//! [`crate::sync::synchronize`] give up on that pass.

use std::path::PathBuf;

use crate::sink::Sink;
use crate::summary::Summary;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read source file {path:?}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write destination file {path:?}: {source}")]
    DestUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("short write to {path:?}: wrote {written} of {expected} bytes")]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },

    /// File content is already in place, only the timestamps are off.
    #[error("failed setting modification time of {path:?}: {source}")]
    MtimeSyncFailed {
        path: PathBuf,
        bytes_copied: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open directory {path:?} for reading: {source}")]
    DirectoryOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create directory {path:?}: {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to remove {path:?}: not a regular file or directory")]
    UnsupportedEntryKind { path: PathBuf },

    #[error("failed removing {path:?}: {source}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Narrates the error and returns a summary counting it.
    pub fn report(&self, sink: &dyn Sink) -> Summary {
        tracing::warn!("{}", self);
        sink.line(&format!("error: {self}"));
        Summary {
            errors: 1,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Error::SourceUnreadable { path, .. }
            | Error::DestUnwritable { path, .. }
            | Error::ShortWrite { path, .. }
            | Error::MtimeSyncFailed { path, .. }
            | Error::DirectoryOpenFailed { path, .. }
            | Error::DirectoryCreateFailed { path, .. }
            | Error::UnsupportedEntryKind { path }
            | Error::RemoveFailed { path, .. } => path,
        }
    }
}
