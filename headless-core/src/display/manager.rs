//! Virtual display subprocess lifecycle management.
//!
//! Starting the display is best-effort: a missing binary, a failed spawn, or
//! a readiness timeout is logged but never fails the supervisor. Applications
//! that actually need the display will surface their own error.

use std::process::Child;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::config::DisplayConfig;
use super::xvfb;

/// Interval between readiness check attempts.
const READY_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Grace period between the termination signal and a forced kill.
const STOP_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Interval between exit checks while stopping.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Why the display never became ready. Only ever logged.
#[derive(Debug, thiserror::Error)]
enum ReadyError {
    #[error("display server exited before becoming ready ({0:?})")]
    Exited(std::process::ExitStatus),

    #[error("display socket did not appear within {0:?}")]
    Timeout(Duration),

    #[error("error while waiting for display server: {0}")]
    Io(#[from] std::io::Error),
}

/// Manages the virtual display server subprocess.
///
/// The child's lifetime is tied to the manager's: [`DisplayManager::stop`]
/// performs the termination attempt at most once, and `Drop` covers every
/// other exit path.
pub struct DisplayManager {
    config: DisplayConfig,
    process: Option<Child>,
}

impl DisplayManager {
    /// Create a manager for the given display configuration.
    #[must_use]
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            config,
            process: None,
        }
    }

    /// The display name the managed server is (or would be) bound to.
    pub fn display_name(&self) -> String {
        self.config.display_name()
    }

    /// Start the display server and wait for it to accept connections.
    ///
    /// Best-effort by contract:
    /// - binary not found: warns and returns
    /// - spawn failure: warns and returns
    /// - readiness timeout: warns, the child is kept and cleaned up normally
    pub async fn start(&mut self) {
        let binary = self.config.binary();

        if !xvfb::is_installed(&binary) {
            warn!(
                binary = %binary.display(),
                "display server binary not found; continuing without a virtual display"
            );
            return;
        }

        if let Some(info) = xvfb::check_installation(&binary).await {
            debug!(version = %info.version, path = %info.path, "found display server");
        }

        info!(
            display = %self.config.display_name(),
            screen = %self.config.screen_spec(),
            "starting virtual display"
        );

        let child = match xvfb::spawn_display(&self.config) {
            Ok(child) => child,
            Err(e) => {
                warn!(error = %e, "failed to start display server");
                return;
            }
        };

        debug!(pid = child.id(), "display server spawned");
        self.process = Some(child);

        if let Err(e) = self.wait_for_ready().await {
            warn!(error = %e, "virtual display did not become ready");
        }
    }

    /// Whether the managed display server is currently running.
    pub fn is_running(&mut self) -> bool {
        match self.process.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Stop the display server and reap it.
    ///
    /// Sends a termination signal, waits a bounded grace period for the
    /// server to exit, then forces a kill. Runs at most once; a second call
    /// is a no-op. An already-exited child is not an error.
    pub fn stop(&mut self) {
        let Some(mut child) = self.process.take() else {
            return;
        };

        info!("stopping virtual display");
        send_term(&child);

        let start = std::time::Instant::now();
        while start.elapsed() < STOP_GRACE_PERIOD {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(status = ?status, "display server stopped");
                    return;
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(error = %e, "error waiting for display server to exit");
                    break;
                }
            }
            std::thread::sleep(STOP_POLL_INTERVAL);
        }

        // Still alive after the grace period; force it
        if let Err(e) = child.kill() {
            // NotFound means the process already exited
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!(error = %e, "failed to kill display server");
            }
        }
        match child.wait() {
            Ok(status) => debug!(status = ?status, "display server stopped"),
            Err(e) => debug!(error = %e, "error waiting for display server to exit"),
        }
    }

    /// Wait for the X socket to appear, detecting early child exit.
    async fn wait_for_ready(&mut self) -> Result<(), ReadyError> {
        let socket = xvfb::socket_path(self.config.number);
        let start = std::time::Instant::now();

        loop {
            if socket.exists() {
                debug!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "virtual display is ready"
                );
                return Ok(());
            }

            if let Some(child) = self.process.as_mut()
                && let Some(status) = child.try_wait()?
            {
                self.process = None;
                return Err(ReadyError::Exited(status));
            }

            if start.elapsed() >= self.config.ready_timeout {
                return Err(ReadyError::Timeout(self.config.ready_timeout));
            }

            tokio::time::sleep(READY_CHECK_INTERVAL).await;
        }
    }
}

/// Ask the child to terminate (SIGTERM on Unix).
#[cfg(unix)]
fn send_term(child: &Child) {
    // SAFETY: signals only the child we spawned; ESRCH means it already
    // exited and is handled by the caller's reap
    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGTERM);
    }
}

/// Ask the child to terminate (non-Unix: no soft signal, the grace-period
/// loop falls through to the forced kill).
#[cfg(not(unix))]
fn send_term(_child: &Child) {}

impl Drop for DisplayManager {
    fn drop(&mut self) {
        if let Some(mut child) = self.process.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
