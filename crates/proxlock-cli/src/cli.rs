//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Automatic session lock/unlock using Bluetooth proximity.
#[derive(Debug, Parser)]
#[command(name = "proxlock")]
#[command(about = "Automatic session lock/unlock using Bluetooth proximity", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file [default: ~/.config/proxlock/config.toml]
    #[arg(long, global = true, env = "PROXLOCK_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Search for a Bluetooth device by name and save its address
    Scan {
        /// Advertised device name (prompted for if omitted)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Activate automatic lock/unlock
    Start,

    /// Modify the current configuration
    Config,

    /// Check once whether the configured device is in range
    Probe,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_start() {
        let cli = Cli::try_parse_from(["proxlock", "start"]).unwrap();
        assert_eq!(cli.command, Command::Start);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_scan_with_name_and_global_flags() {
        let cli = Cli::try_parse_from([
            "proxlock",
            "scan",
            "--name",
            "Pixel 8",
            "-vv",
            "--config",
            "/tmp/proxlock.toml",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Scan {
                name: Some("Pixel 8".to_string())
            }
        );
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/proxlock.toml")));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["proxlock"]).is_err());
    }
}
