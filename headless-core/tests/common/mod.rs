//! Shared fixtures for integration tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use headless_core::display::DisplayConfig;

/// Executable stand-in for the display server: answers the `-version` probe,
/// then stays alive until killed.
pub fn fake_xvfb(dir: &Path) -> PathBuf {
    let script = dir.join("fake-xvfb");
    std::fs::write(
        &script,
        "#!/bin/sh\ncase \"$1\" in -version) echo 'X.Org X Server 0.0' >&2; exit 0;; esac\nexec sleep 30\n",
    )
    .unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    script
}

/// Display config pointed at the stand-in, on a display number high enough
/// to avoid colliding with a real X server.
pub fn test_config(dir: &Path, number: u32) -> DisplayConfig {
    DisplayConfig {
        number,
        xvfb_path: Some(fake_xvfb(dir)),
        // the stand-in never creates the X socket; don't wait long for it
        ready_timeout: Duration::from_millis(100),
        ..Default::default()
    }
}
