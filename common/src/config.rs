//! Configuration types for a mirror run

use std::path::{Path, PathBuf};

use crate::path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot resolve {path:?}: {source}")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("source and destination are the same directory: {path:?}")]
    SameRoots { path: PathBuf },

    #[error("{outer:?} contains {inner:?}, cannot mirror recursively")]
    NestedRoots { outer: PathBuf, inner: PathBuf },
}

/// Everything one mirror pass needs to know. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    source_root: PathBuf,
    dest_root: PathBuf,
    recursive: bool,
    size_threshold: u64,
}

fn resolve_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let resolved = path
        .canonicalize()
        .map_err(|source| ConfigError::Canonicalize {
            path: path.to_owned(),
            source,
        })?;
    if !resolved.is_dir() {
        return Err(ConfigError::NotADirectory { path: resolved });
    }
    Ok(resolved)
}

impl SyncRequest {
    /// Resolves both roots to canonical absolute paths and validates them.
    ///
    /// Both must be existing directories and must differ. In recursive mode neither may contain
    /// the other.
    pub fn new(
        source_root: &Path,
        dest_root: &Path,
        recursive: bool,
        size_threshold: u64,
    ) -> Result<Self, ConfigError> {
        let source_root = resolve_dir(source_root)?;
        let dest_root = resolve_dir(dest_root)?;
        if source_root == dest_root {
            return Err(ConfigError::SameRoots { path: source_root });
        }
        if recursive {
            for (outer, inner) in [(&source_root, &dest_root), (&dest_root, &source_root)] {
                if path::contains(outer, inner) {
                    return Err(ConfigError::NestedRoots {
                        outer: outer.clone(),
                        inner: inner.clone(),
                    });
                }
            }
        }
        Ok(Self {
            source_root,
            dest_root,
            recursive,
            size_threshold,
        })
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    /// Files larger than this many bytes are copied through a memory mapping.
    pub fn size_threshold(&self) -> u64 {
        self.size_threshold
    }
}

/// Output and logging configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Suppress error output
    pub quiet: bool,
    /// Verbosity level: 0=ERROR, 1=INFO, 2=DEBUG, 3=TRACE
    pub verbose: u8,
    /// Print summary statistics at the end
    pub print_summary: bool,
}

/// Tracing configuration for diagnostics
#[derive(Debug, Default, Clone)]
pub struct TracingConfig {
    /// Name used as the root span of the run
    pub trace_identifier: String,
    /// Diagnostics file path, stderr when unset
    pub debug_log_file: Option<PathBuf>,
}
