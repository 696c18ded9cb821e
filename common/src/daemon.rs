//! Detaching from the controlling terminal
//!
//! Must be called before any threads are started (in particular before the tokio runtime is
//! built): only the forking thread survives a fork.

use std::os::fd::AsRawFd;

use anyhow::{Context, Result};
use nix::sys::signal::{SigHandler, Signal};
use nix::unistd::ForkResult;

/// File mode creation mask of the daemon: group and world write bits are cleared.
pub const UMASK: libc::mode_t = 0o022;

fn fork_and_exit_parent() -> Result<()> {
    // SAFETY: called while the process is still single threaded
    match unsafe { nix::unistd::fork() }.context("fork failed")? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => Ok(()),
    }
}

fn redirect_stdio() -> Result<()> {
    let dev_null = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/null")
        .context("cannot open /dev/null")?;
    for fd in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
        // SAFETY: both descriptors are valid for the duration of the call
        if unsafe { libc::dup2(dev_null.as_raw_fd(), fd) } < 0 {
            return Err(std::io::Error::last_os_error())
                .with_context(|| format!("cannot redirect descriptor {fd} to /dev/null"));
        }
    }
    Ok(())
}

/// Turns the current process into a background daemon.
///
/// The parent returns to the shell with status 0, the surviving grandchild runs in a new
/// session with no controlling terminal, `/` as working directory, [`UMASK`] as umask and
/// standard streams pointing to `/dev/null`. Paths handed to the daemon must be absolute.
pub fn daemonize() -> Result<()> {
    fork_and_exit_parent()?;
    nix::unistd::setsid().context("setsid failed")?;
    for signal in [Signal::SIGHUP, Signal::SIGCHLD] {
        // SAFETY: ignoring a signal installs no handler code
        unsafe { nix::sys::signal::signal(signal, SigHandler::SigIgn) }
            .with_context(|| format!("cannot ignore {signal:?}"))?;
    }
    // the daemon itself must not be a session leader
    fork_and_exit_parent()?;
    nix::sys::stat::umask(nix::sys::stat::Mode::from_bits_truncate(UMASK));
    std::env::set_current_dir("/").context("cannot change directory to /")?;
    redirect_stdio()?;
    Ok(())
}
