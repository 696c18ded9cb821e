//! Directory mirroring engine behind the `rmir` tool
//!
//! `rmir` keeps a destination directory identical to a source directory. Each mirror pass has
//! two phases:
//!
//! 1. **reclaim** ([`rm::remove_extras`]) deletes destination entries that have no counterpart of
//!    the same kind in the source,
//! 2. **reconcile** ([`sync::reconcile`]) walks the source, creates whatever is missing in the
//!    destination and copies every regular file whose modification time differs.
//!
//! Modification time is the only change signal: files are never compared by content. Only
//! regular files and directories are mirrored, symlinks and special files are skipped.
//!
//! Every decision is narrated line by line to a [`Sink`] handed in by the caller.
//!
//! # Example
//!
//! ```no_run
//! use common::{MemorySink, SyncRequest};
//!
//! let request = SyncRequest::new("/data/src".as_ref(), "/data/dst".as_ref(), true, 1 << 20)?;
//! let sink = MemorySink::new();
//! let summary = common::synchronize(&request, &sink)?;
//! println!("{summary}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use tracing::Instrument;

pub mod config;
pub mod copy;
pub mod daemon;
pub mod entry;
pub mod error;
pub mod listing;
pub mod materialize;
pub mod path;
pub mod rm;
pub mod schedule;
pub mod sink;
pub mod summary;
pub mod sync;
pub mod version;

#[cfg(test)]
mod testutils;

pub use config::{ConfigError, OutputConfig, SyncRequest, TracingConfig};
pub use entry::{Entry, EntryKind};
pub use error::Error;
pub use schedule::Schedule;
pub use sink::{MemorySink, NullSink, Sink, SyslogSink, WriterSink};
pub use summary::Summary;
pub use sync::synchronize;

fn init_tracing(output: &OutputConfig, tracing_config: &TracingConfig) -> anyhow::Result<()> {
    use anyhow::Context;
    use tracing_subscriber::fmt::writer::BoxMakeWriter;
    let level = if output.quiet {
        "off"
    } else {
        match output.verbose {
            0 => "error",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let (writer, ansi) = match &tracing_config.debug_log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed opening debug log file {path:?}"))?;
            (BoxMakeWriter::new(std::sync::Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed initializing tracing: {err}"))?;
    Ok(())
}

/// Common entry point of the command line tools.
///
/// Sets up diagnostics, builds a single threaded tokio runtime and drives `func` on it. Errors
/// are printed to stderr (unless quiet) and turned into `None`; on success the summary is
/// printed if requested and returned.
pub fn run<Fut, T>(
    output: OutputConfig,
    tracing_config: TracingConfig,
    func: impl FnOnce() -> Fut,
) -> Option<T>
where
    T: std::fmt::Display,
    Fut: std::future::Future<Output = anyhow::Result<T>>,
{
    if let Err(error) = init_tracing(&output, &tracing_config) {
        if !output.quiet {
            eprintln!("{error:#}");
        }
        return None;
    }
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            if !output.quiet {
                eprintln!("failed building tokio runtime: {error}");
            }
            return None;
        }
    };
    let span = tracing::info_span!("run", tool = %tracing_config.trace_identifier);
    let res = runtime.block_on(func().instrument(span));
    match res {
        Ok(summary) => {
            if output.print_summary {
                println!("{summary}");
            }
            Some(summary)
        }
        Err(error) => {
            if !output.quiet {
                eprintln!("{error:#}");
            }
            None
        }
    }
}
