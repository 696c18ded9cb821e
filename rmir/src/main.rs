use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::instrument;

fn long_version() -> &'static str {
    static VERSION: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION.get_or_init(|| common::version::VersionInfo::current().display())
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rmir",
    version,
    long_version = long_version(),
    about = "Mirror a directory into another one, once or periodically",
    long_about = "`rmir` makes DST an exact copy of SRC: files missing from DST or whose modification time \
differs are copied, entries of DST that do not exist in SRC are deleted.

Only regular files and directories are mirrored. Symlinks and special files in SRC are skipped, and they are \
never deleted from DST. Files are compared by modification time only, never by content.

EXAMPLES:
    # Mirror once, including subdirectories
    rmir -R --once /data/src /backup/src

    # Keep mirroring every 30 seconds in the background, narrating to syslog
    rmir -R --daemon --interval 30 /data/src /backup/src

    # Show both trees without changing anything
    rmir -R --list /data/src /backup/src

Note: DST is modified to match SRC, anything in DST that is not in SRC will be deleted."
)]
struct Args {
    // Mirroring options
    /// Descend into subdirectories
    #[arg(short = 'R', long, help_heading = "Mirroring options")]
    recursive: bool,

    /// Run a single pass and exit
    #[arg(long, help_heading = "Mirroring options")]
    once: bool,

    /// Time between passes
    ///
    /// Plain integers are seconds, human readable durations such as "500ms" or "2min" are also
    /// accepted. Ignored with --once.
    #[arg(
        short = 'i',
        long,
        default_value = "5",
        value_name = "DURATION",
        value_parser = common::schedule::parse_interval,
        help_heading = "Mirroring options"
    )]
    interval: std::time::Duration,

    /// Files larger than this are copied through a memory mapping, smaller ones in chunks
    ///
    /// Accepts sizes such as "4096", "64KiB" or "1MiB".
    #[arg(
        short = 't',
        long,
        default_value = "1MiB",
        value_name = "SIZE",
        help_heading = "Mirroring options"
    )]
    size_threshold: bytesize::ByteSize,

    /// List both trees and exit without changing anything
    #[arg(long, help_heading = "Mirroring options")]
    list: bool,

    // Process
    /// Detach from the terminal and keep running in the background
    ///
    /// The daemon runs from "/" with a umask of 022: mirrored files and directories are never
    /// group or world writable.
    #[arg(short = 'd', long, conflicts_with = "list", help_heading = "Process")]
    daemon: bool,

    // Progress & output
    /// Append narration to this file instead of printing it
    #[arg(
        long,
        value_name = "PATH",
        conflicts_with = "syslog",
        help_heading = "Progress & output"
    )]
    log: Option<std::path::PathBuf>,

    /// Send narration to syslog (default with --daemon unless --log is given)
    #[arg(long, help_heading = "Progress & output")]
    syslog: bool,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH", help_heading = "Progress & output")]
    debug_log: Option<std::path::PathBuf>,

    /// Verbose level (diagnostics): -v INFO / -vv DEBUG / -vvv TRACE (default: ERROR)
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help_heading = "Progress & output"
    )]
    verbose: u8,

    /// Print summary at the end
    #[arg(long, help_heading = "Progress & output")]
    summary: bool,

    /// Quiet mode, no narration and no error output
    #[arg(short = 'q', long = "quiet", help_heading = "Progress & output")]
    quiet: bool,

    // ARGUMENTS
    /// Directory to mirror from
    #[arg()]
    src: std::path::PathBuf,

    /// Directory to mirror into
    #[arg()]
    dst: std::path::PathBuf,
}

fn make_sink(args: &Args) -> Result<Arc<dyn common::Sink>> {
    if args.quiet {
        return Ok(Arc::new(common::NullSink));
    }
    if let Some(path) = &args.log {
        let sink = common::WriterSink::append(path)
            .with_context(|| format!("failed opening log file {path:?}"))?;
        return Ok(Arc::new(sink));
    }
    if args.syslog || args.daemon {
        return Ok(Arc::new(common::SyslogSink::open("rmir")));
    }
    Ok(Arc::new(common::WriterSink::stdout()))
}

fn list(request: &common::SyncRequest, sink: &dyn common::Sink) -> Result<()> {
    for root in [request.source_root(), request.dest_root()] {
        common::listing::list_tree(root, request.recursive(), sink)
            .with_context(|| format!("failed listing {root:?}"))?;
    }
    Ok(())
}

#[instrument(skip(sink))]
async fn async_main(
    args: Args,
    request: common::SyncRequest,
    sink: Arc<dyn common::Sink>,
) -> Result<common::Summary> {
    let schedule = if args.once {
        common::Schedule::Once
    } else {
        common::Schedule::Every(args.interval)
    };
    // signals arriving mid-pass are held until the pass ends
    let shutdown = common::schedule::shutdown_signal()?;
    common::schedule::run(request, schedule, sink, shutdown).await
}

fn absolute(path: &Option<std::path::PathBuf>) -> Result<Option<std::path::PathBuf>> {
    path.as_deref()
        .map(|path| {
            std::path::absolute(path).with_context(|| format!("cannot resolve {path:?}"))
        })
        .transpose()
}

fn main() -> Result<()> {
    let mut args = Args::parse();
    let request = match common::SyncRequest::new(
        &args.src,
        &args.dst,
        args.recursive,
        args.size_threshold.as_u64(),
    ) {
        Ok(request) => request,
        Err(error) => {
            if !args.quiet {
                eprintln!("rmir: {error}");
            }
            std::process::exit(1);
        }
    };
    if args.list {
        return list(&request, &common::WriterSink::stdout());
    }
    // the daemon runs from "/", relative paths would point elsewhere
    args.log = absolute(&args.log)?;
    args.debug_log = absolute(&args.debug_log)?;
    if args.daemon {
        common::daemon::daemonize()?;
    }
    let sink = make_sink(&args)?;
    let output = common::OutputConfig {
        quiet: args.quiet,
        verbose: args.verbose,
        print_summary: args.summary,
    };
    let tracing_config = common::TracingConfig {
        trace_identifier: "rmir".to_string(),
        debug_log_file: args.debug_log.clone(),
    };
    let res = common::run(output, tracing_config, || async_main(args, request, sink));
    if res.is_none() {
        std::process::exit(1);
    }
    Ok(())
}
