//! Resident-parent run mode.
//!
//! Spawns the wrapped command with `DISPLAY` set and inherited stdio, stays
//! resident to forward termination signals, and reports the child's exit
//! code. Children killed by a signal map to the conventional `128 + N`.

use tracing::debug;

/// Result type for supervise operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from running the wrapped command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invoked with an empty argument list.
    #[error("no command given")]
    EmptyCommand,

    /// The command could not be spawned.
    #[error("failed to run {0}: {1}")]
    Spawn(String, #[source] std::io::Error),

    /// Waiting on the command failed.
    #[error("failed waiting for {0}: {1}")]
    Wait(String, #[source] std::io::Error),

    /// A signal handler could not be installed.
    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),
}

/// Run `argv` with `DISPLAY` pointing at the given display.
///
/// Returns the child's exit code once it terminates. While the child runs,
/// SIGTERM, SIGINT and SIGHUP received by the supervisor are forwarded to it.
pub async fn run(argv: &[String], display: &str) -> Result<i32> {
    let Some((program, args)) = argv.split_first() else {
        return Err(Error::EmptyCommand);
    };

    let mut child = tokio::process::Command::new(program)
        .args(args)
        .env("DISPLAY", display)
        .spawn()
        .map_err(|e| Error::Spawn(program.clone(), e))?;

    debug!(pid = child.id(), command = %program, "command spawned");

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).map_err(Error::Signal)?;
        let mut int = signal(SignalKind::interrupt()).map_err(Error::Signal)?;
        let mut hup = signal(SignalKind::hangup()).map_err(Error::Signal)?;

        loop {
            tokio::select! {
                status = child.wait() => {
                    let status = status.map_err(|e| Error::Wait(program.clone(), e))?;
                    debug!(status = ?status, "command exited");
                    return Ok(exit_code(status));
                }
                _ = term.recv() => forward_signal(&child, libc::SIGTERM),
                _ = int.recv() => forward_signal(&child, libc::SIGINT),
                _ = hup.recv() => forward_signal(&child, libc::SIGHUP),
            }
        }
    }

    #[cfg(not(unix))]
    {
        let status = child
            .wait()
            .await
            .map_err(|e| Error::Wait(program.clone(), e))?;
        Ok(exit_code(status))
    }
}

/// Forward a signal to the child, if it is still running.
#[cfg(unix)]
fn forward_signal(child: &tokio::process::Child, sig: i32) {
    match child.id() {
        Some(pid) => {
            debug!(pid, sig, "forwarding signal to command");
            // SAFETY: sends a signal to the child we spawned, nothing else
            let rc = unsafe { libc::kill(pid as libc::pid_t, sig) };
            if rc != 0 {
                tracing::warn!(pid, sig, "failed to forward signal");
            }
        }
        None => debug!(sig, "command already exited, not forwarding signal"),
    }
}

/// Map an exit status to a shell-style exit code.
fn exit_code(status: std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    status.code().unwrap_or(1)
}
