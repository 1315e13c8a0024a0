//! Process-image replacement for the wrapped command.
//!
//! The faithful entrypoint behavior: the supervisor execs into the command,
//! preserving its PID and file descriptors. The display server is inherited
//! by the new image and left to container teardown.

/// Errors from attempting the exec.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invoked with an empty argument list.
    #[error("no command given")]
    EmptyCommand,

    /// The exec itself failed; the supervisor is still alive.
    #[error("failed to exec {0}: {1}")]
    Exec(String, #[source] std::io::Error),

    /// Exec mode requires execvp(2).
    #[error("exec mode is not supported on this platform")]
    Unsupported,
}

/// Replace the current process image with `argv`, with `DISPLAY` set.
///
/// On success this never returns. The returned error means the replacement
/// did not happen and the caller should clean up and exit.
#[cfg(unix)]
pub fn exec_command(argv: &[String], display: &str) -> Error {
    use std::os::unix::process::CommandExt;

    let Some((program, args)) = argv.split_first() else {
        return Error::EmptyCommand;
    };

    let err = std::process::Command::new(program)
        .args(args)
        .env("DISPLAY", display)
        .exec();

    Error::Exec(program.clone(), err)
}

/// Replace the current process image with `argv` (non-Unix stub).
#[cfg(not(unix))]
pub fn exec_command(argv: &[String], display: &str) -> Error {
    let _ = (argv, display);
    Error::Unsupported
}
