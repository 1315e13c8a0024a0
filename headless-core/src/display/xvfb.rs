//! Xvfb CLI wrapper and output parsing.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use super::config::DisplayConfig;

/// Result of checking the Xvfb installation.
#[derive(Debug, Clone)]
pub struct XvfbInfo {
    pub version: String,
    pub path: String,
}

/// Check if the display server binary exists on PATH (or at the given path).
pub fn is_installed(binary: &Path) -> bool {
    which::which(binary).is_ok()
}

/// Probe the display server binary for its version banner.
///
/// Used for logging only; a failed probe does not prevent a start attempt.
pub async fn check_installation(binary: &Path) -> Option<XvfbInfo> {
    let output = Command::new(binary).arg("-version").output().await.ok()?;

    // X servers print their banner to stderr
    let banner = String::from_utf8_lossy(&output.stderr);
    let version = parse_version(&banner).unwrap_or_else(|| "unknown".to_string());

    let path = which::which(binary).ok()?.to_string_lossy().to_string();

    Some(XvfbInfo { version, path })
}

/// Build the display server argument list for the given configuration.
///
/// Matches the classic invocation: `Xvfb :99 -screen 0 1280x720x16`.
pub fn display_args(config: &DisplayConfig) -> Vec<String> {
    vec![
        config.display_name(),
        "-screen".to_string(),
        "0".to_string(),
        config.screen_spec(),
    ]
}

/// Spawn the display server, detached from foreground I/O.
pub fn spawn_display(config: &DisplayConfig) -> std::io::Result<std::process::Child> {
    let mut cmd = std::process::Command::new(config.binary());
    cmd.args(display_args(config));

    // Xvfb is chatty on stderr; the wrapped command owns the terminal
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    cmd.spawn()
}

/// Path of the X socket the server creates once it is accepting connections.
pub fn socket_path(display_number: u32) -> PathBuf {
    PathBuf::from(format!("/tmp/.X11-unix/X{}", display_number))
}

/// Parse a version number out of an X server banner.
///
/// Looks for a line like "X.Org X Server 21.1.7" and takes the last token.
pub fn parse_version(banner: &str) -> Option<String> {
    let line = banner.lines().find(|l| l.contains("X Server"))?;
    line.split_whitespace().last().map(|v| v.to_string())
}
