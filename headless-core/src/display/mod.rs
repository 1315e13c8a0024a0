//! Virtual display lifecycle: configuration, Xvfb wrapper, and manager.

mod config;
mod manager;
pub mod xvfb;

pub use config::{
    DEFAULT_BINARY, DEFAULT_DEPTH, DEFAULT_DISPLAY_NUMBER, DEFAULT_GEOMETRY,
    DEFAULT_READY_TIMEOUT, DisplayConfig, Geometry, ParseGeometryError,
};
pub use manager::DisplayManager;
