//! Lock and unlock command dispatch.
//!
//! Commands are shell strings launched fire-and-forget: the monitor never
//! waits for them, never reads their output, and never checks their exit
//! status. Overlapping invocations are not serialized.

use std::path::PathBuf;
use std::process::Stdio;

use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigError, ConfigResult};

/// Failure to start a command.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The shell could not be spawned.
    #[error("Failed to launch '{command}': {source}")]
    SpawnFailed {
        /// Command line that was being launched.
        command: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },
}

/// Starts shell commands without observing their result.
pub trait CommandLauncher {
    /// Launch `command` detached.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] only if the process could not be started.
    fn launch(&self, command: &str) -> Result<(), LaunchError>;
}

/// Runs commands through `sh -c` with stdio discarded.
///
/// The child gets its own process group so an interrupt aimed at proxlock
/// does not also kill a running screen locker. Must be called from within a
/// Tokio runtime, which reaps the exited children.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellLauncher;

impl CommandLauncher for ShellLauncher {
    fn launch(&self, command: &str) -> Result<(), LaunchError> {
        let mut cmd = std::process::Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = tokio::process::Command::from(cmd)
            .kill_on_drop(false)
            .spawn()
            .map_err(|source| LaunchError::SpawnFailed {
                command: command.to_string(),
                source,
            })?;

        debug!(command, pid = ?child.id(), "Launched command");
        Ok(())
    }
}

/// The program a command line invokes: its first whitespace-separated word.
#[must_use]
pub fn program_name(command: &str) -> Option<&str> {
    command.split_whitespace().next()
}

/// Resolve the program of `command` on the search path.
#[must_use]
pub fn resolve_executable(command: &str) -> Option<PathBuf> {
    program_name(command).and_then(|program| which::which(program).ok())
}

/// Require that `command` names an executable on the search path.
///
/// # Errors
///
/// Returns [`ConfigError::CommandNotFound`] naming `field` when it does not.
pub fn ensure_executable(field: &'static str, command: &str) -> ConfigResult<PathBuf> {
    resolve_executable(command).ok_or_else(|| ConfigError::CommandNotFound {
        field,
        command: command.to_string(),
        program: program_name(command).unwrap_or_default().to_string(),
    })
}
