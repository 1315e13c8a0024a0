//! headless-core: library for the headless virtual-display entrypoint
//!
//! This crate provides the pieces the `headless` binary is assembled from:
//!
//! - **Display lifecycle** - [`display::DisplayManager`] for spawning the
//!   virtual X server and tying its lifetime to the supervisor's
//! - **Supervise mode** - [`supervise::run`] to stay resident as the parent,
//!   forward signals, and propagate the wrapped command's exit code
//! - **Exec mode** - [`exec::exec_command`] for faithful process-image
//!   replacement, preserving PID and file descriptors
//!
//! # Quick Start
//!
//! ```no_run
//! use headless_core::display::{DisplayConfig, DisplayManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut manager = DisplayManager::new(DisplayConfig::default());
//! manager.start().await;
//!
//! let argv = vec!["xclock".to_string()];
//! let code = headless_core::supervise::run(&argv, &manager.display_name()).await?;
//!
//! manager.stop();
//! std::process::exit(code);
//! # }
//! ```

pub mod display;
pub mod exec;
pub mod supervise;

// Re-export key types for convenience
pub use display::{DisplayConfig, DisplayManager, Geometry};
