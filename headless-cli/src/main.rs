use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

mod config;

use config::{ConfigLoader, HeadlessConfig};
use headless_core::display::{DisplayManager, Geometry};
use headless_core::{exec, supervise};

#[derive(Parser)]
#[command(name = "headless", about = "Run a command under a virtual X display")]
#[command(version)]
struct Cli {
    /// Display number to start the virtual display on (e.g. 99 for :99)
    #[arg(long)]
    display: Option<u32>,

    /// Framebuffer geometry, WIDTHxHEIGHT
    #[arg(long)]
    screen: Option<Geometry>,

    /// Color depth in bits
    #[arg(long)]
    depth: Option<u16>,

    /// Path to the display server binary (defaults to Xvfb from PATH)
    #[arg(long)]
    xvfb_path: Option<PathBuf>,

    /// Path to an explicit config file, layered over user and project config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replace this process with COMMAND instead of supervising it
    #[arg(long)]
    exec: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Command to run under the virtual display
    #[arg(value_name = "COMMAND", trailing_var_arg = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, &cli);

    let display_name = config.display.display_name();
    tracing::debug!(
        display = %display_name,
        screen = %config.display.screen_spec(),
        exec = config.exec,
        "configuration resolved"
    );

    let mut manager = DisplayManager::new(config.display.clone());
    manager.start().await;

    if config.exec {
        // Only returns on failure. On success the image is replaced, the
        // display server is inherited by the new program, and container
        // teardown reclaims it.
        let err = exec::exec_command(&cli.command, &display_name);
        manager.stop();
        return Err(err.into());
    }

    let result = supervise::run(&cli.command, &display_name).await;
    manager.stop();

    let code = result?;
    std::process::exit(code);
}

/// CLI flags override config-file values.
fn apply_cli_overrides(config: &mut HeadlessConfig, cli: &Cli) {
    if let Some(number) = cli.display {
        config.display.number = number;
    }
    if let Some(screen) = cli.screen {
        config.display.geometry = screen;
    }
    if let Some(depth) = cli.depth {
        config.display.depth = depth;
    }
    if let Some(ref path) = cli.xvfb_path {
        config.display.xvfb_path = Some(path.clone());
    }
    if cli.exec {
        config.exec = true;
    }
}
