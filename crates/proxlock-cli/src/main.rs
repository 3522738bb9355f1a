//! # proxlock
//!
//! Locks the session when a paired Bluetooth device leaves and unlocks it
//! when the device returns.
//!
//! ## Running
//!
//! ```bash
//! # Find your phone and save its address
//! proxlock scan --name "Pixel 8"
//!
//! # Adjust lock commands and timings
//! proxlock config
//!
//! # Start monitoring (Ctrl+C to stop)
//! proxlock start
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::process::ExitCode;

use clap::Parser;
use proxlock_cli::cli::{Cli, Command};
use proxlock_cli::commands;
use proxlock_cli::context::AppContext;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _logging = match proxlock_cli::logging::init(cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(commands::exit_code(&e))
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let mut ctx = AppContext::load(cli.config)?;
    debug!(command = ?cli.command, "Dispatching");

    match cli.command {
        Command::Scan { name } => commands::scan(&mut ctx, name).await,
        Command::Start => commands::start(&ctx).await,
        Command::Config => commands::configure(&mut ctx),
        Command::Probe => commands::probe(&ctx).await,
    }
}
