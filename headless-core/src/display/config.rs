//! Virtual display configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default display number (`:99`).
pub const DEFAULT_DISPLAY_NUMBER: u32 = 99;

/// Default framebuffer geometry.
pub const DEFAULT_GEOMETRY: Geometry = Geometry {
    width: 1280,
    height: 720,
};

/// Default color depth in bits.
pub const DEFAULT_DEPTH: u16 = 16;

/// Default display server binary, resolved from PATH.
pub const DEFAULT_BINARY: &str = "Xvfb";

/// Maximum time to wait for the display socket to appear.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Framebuffer geometry in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Error parsing a geometry string.
#[derive(Debug, thiserror::Error)]
#[error("invalid geometry {0:?}, expected WIDTHxHEIGHT (e.g. 1280x720)")]
pub struct ParseGeometryError(String);

impl FromStr for Geometry {
    type Err = ParseGeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('x');
        let (Some(width), Some(height), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ParseGeometryError(s.to_string()));
        };
        let width = width
            .parse()
            .map_err(|_| ParseGeometryError(s.to_string()))?;
        let height = height
            .parse()
            .map_err(|_| ParseGeometryError(s.to_string()))?;
        Ok(Geometry { width, height })
    }
}

/// Configuration for the virtual display server.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Display number; the server is started on `:<number>`.
    pub number: u32,

    /// Framebuffer geometry.
    pub geometry: Geometry,

    /// Color depth in bits.
    pub depth: u16,

    /// Override path for the display server binary.
    ///
    /// When `None`, `Xvfb` is resolved from PATH.
    pub xvfb_path: Option<PathBuf>,

    /// How long to wait for the display to become ready after spawning.
    pub ready_timeout: Duration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            number: DEFAULT_DISPLAY_NUMBER,
            geometry: DEFAULT_GEOMETRY,
            depth: DEFAULT_DEPTH,
            xvfb_path: None,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }
}

impl DisplayConfig {
    /// The display name in X notation, e.g. `:99`.
    pub fn display_name(&self) -> String {
        format!(":{}", self.number)
    }

    /// The Xvfb screen specification, e.g. `1280x720x16`.
    pub fn screen_spec(&self) -> String {
        format!("{}x{}", self.geometry, self.depth)
    }

    /// The display server binary to launch.
    pub fn binary(&self) -> PathBuf {
        self.xvfb_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY))
    }
}
