use std::path::PathBuf;

use headless_core::display::DisplayConfig;
use serde::{Deserialize, Serialize};

/// Raw `[display]` section as read from TOML (all fields optional).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDisplaySection {
    /// Display number, e.g. 99 for `:99`.
    pub number: Option<u32>,
    /// Framebuffer geometry, e.g. "1280x720".
    pub screen: Option<String>,
    /// Color depth in bits.
    pub depth: Option<u16>,
    /// Override path for the display server binary.
    pub xvfb_path: Option<PathBuf>,
}

/// Raw `[run]` section as read from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRunSection {
    /// Replace the supervisor with the command instead of staying resident.
    pub exec: Option<bool>,
}

/// Raw config file contents before merging and defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawHeadlessConfig {
    pub display: RawDisplaySection,
    pub run: RawRunSection,
}

/// Final merged configuration with defaults applied.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    pub display: DisplayConfig,
    pub exec: bool,
}
