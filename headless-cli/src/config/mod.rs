//! Layered configuration: user config, then project config, then CLI flags.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::HeadlessConfig;
