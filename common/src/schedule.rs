use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::instrument;

use crate::config::SyncRequest;
use crate::sink::Sink;
use crate::summary::Summary;
use crate::sync;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// A single pass.
    Once,
    /// A pass, then a sleep of the given length, repeated until shutdown.
    Every(std::time::Duration),
}

/// Parses a polling interval: plain integer seconds (`"5"`) or a human readable duration
/// (`"500ms"`, `"2min"`). Zero is rejected.
pub fn parse_interval(value: &str) -> Result<std::time::Duration> {
    let interval = match value.trim().parse::<u64>() {
        Ok(seconds) => std::time::Duration::from_secs(seconds),
        Err(_) => humantime::parse_duration(value)
            .with_context(|| format!("invalid interval {value:?}"))?,
    };
    if interval.is_zero() {
        return Err(anyhow::anyhow!("interval must be positive"));
    }
    Ok(interval)
}

/// Installs SIGINT and SIGTERM handlers and returns a future resolving on the first of them.
///
/// The handlers are in place as soon as this returns, before the future is ever polled, so a
/// signal arriving in the middle of a pass is held until the scheduler looks at it. Must be
/// called from within the tokio runtime.
pub fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    use tokio::signal::unix::{SignalKind, signal};
    let mut interrupt =
        signal(SignalKind::interrupt()).context("failed installing SIGINT handler")?;
    let mut terminate =
        signal(SignalKind::terminate()).context("failed installing SIGTERM handler")?;
    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => tracing::info!("received SIGINT"),
            _ = terminate.recv() => tracing::info!("received SIGTERM"),
        }
    })
}

/// Runs mirror passes according to `schedule` and returns the accumulated summary.
///
/// Each pass runs to completion on the blocking thread pool before anything else happens;
/// `shutdown` is only observed while waiting for the next pass. With [`Schedule::Once`] a pass
/// that could not open its roots is an error, with [`Schedule::Every`] it is narrated and the
/// next pass tries again.
#[instrument(skip(sink, shutdown))]
pub async fn run<F>(
    request: SyncRequest,
    schedule: Schedule,
    sink: Arc<dyn Sink>,
    shutdown: F,
) -> Result<Summary>
where
    F: std::future::Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut total = Summary::default();
    let mut passes = 0u64;
    loop {
        passes += 1;
        tracing::info!("starting pass {}", passes);
        let pass = {
            let request = request.clone();
            let sink = sink.clone();
            tokio::task::spawn_blocking(move || sync::synchronize(&request, sink.as_ref()))
                .await
                .context("mirror pass panicked")?
        };
        match pass {
            Ok(summary) => total += summary,
            Err(error) => {
                if schedule == Schedule::Once {
                    return Err(error).context("mirror pass failed");
                }
                total += error.report(sink.as_ref());
            }
        }
        let Schedule::Every(interval) = schedule else {
            break;
        };
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("shutdown requested after {} passes", passes);
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
    Ok(total)
}
