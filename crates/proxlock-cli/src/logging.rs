//! Logging initialization and configuration.
//!
//! Diagnostics always go to stderr in compact form, leaving stdout for
//! command output and the transition log. When `PROXLOCK_LOG_DIR` is set, a
//! JSON layer also writes daily-rolling files to that directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the default log level.
pub const LOG_LEVEL_ENV: &str = "PROXLOCK_LOG_LEVEL";

/// Environment variable enabling JSON file logs in the given directory.
pub const LOG_DIR_ENV: &str = "PROXLOCK_LOG_DIR";

/// Keeps the non-blocking writers alive. Drop it last so buffered lines
/// are flushed before exit.
#[must_use = "dropping the guard stops log output"]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

/// Initialize the logging system.
///
/// # Arguments
///
/// * `verbosity` - Number of `-v` flags; overrides `PROXLOCK_LOG_LEVEL`
///
/// `RUST_LOG`, when set, takes precedence over both.
///
/// # Errors
///
/// Returns an error if the env filter cannot be parsed, or the log directory
/// cannot be created or written.
pub fn init(verbosity: u8) -> anyhow::Result<LoggingGuard> {
    let log_level = level_for(verbosity, std::env::var(LOG_LEVEL_ENV).ok());

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let mut guards = Vec::with_capacity(2);

    // Non-blocking writer for stderr
    let (non_blocking_stderr, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
    guards.push(stderr_guard);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_stderr)
        .with_target(verbosity > 0);

    // File layer - JSON format for structured logging
    let file_layer = match log_directory() {
        Some(log_dir) => {
            let (non_blocking_file, file_guard) =
                tracing_appender::non_blocking(file_appender(&log_dir)?);
            guards.push(file_guard);

            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking_file)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(LoggingGuard { _guards: guards })
}

/// Daily-rolling `proxlock.*` files in `log_dir`, creating it if needed.
fn file_appender(log_dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(log_dir).with_context(|| {
        format!("Failed to create log directory {}", log_dir.display())
    })?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("proxlock")
        .build(log_dir)
        .with_context(|| format!("Failed to open log files in {}", log_dir.display()))
}

/// Filter directive for the given verbosity and configured level.
fn level_for(verbosity: u8, configured: Option<String>) -> String {
    match verbosity {
        0 => configured
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| "info".to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Directory for JSON log files, if enabled.
fn log_directory() -> Option<PathBuf> {
    std::env::var_os(LOG_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
}
