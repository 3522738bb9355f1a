//! Transition events and the log sink they are written to.
//!
//! Every state change produces exactly one line such as
//! ` [18-10-26 14:03:11] ➔ [LOCKED]`. Nothing is retained in memory.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Local};

use crate::types::SessionState;

/// Environment variable selecting the transition log destination.
pub const LOGFILE_ENV: &str = "PROXLOCK_LOGFILE";

/// Destination value meaning standard output.
pub const STDOUT_DESTINATION: &str = "-";

const TIMESTAMP_FORMAT: &str = "%d-%m-%y %H:%M:%S";

/// A lock or unlock transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    /// When the transition happened (local time).
    pub timestamp: DateTime<Local>,
    /// State the session moved to.
    pub new_state: SessionState,
    /// Command that was issued for it.
    pub command_issued: String,
}

impl TransitionEvent {
    /// Event stamped with the current local time.
    #[must_use]
    pub fn now(new_state: SessionState, command_issued: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            new_state,
            command_issued: command_issued.into(),
        }
    }

    /// The line written to the transition log.
    #[must_use]
    pub fn log_line(&self) -> String {
        format!(
            " [{}] ➔ [{}]",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.new_state.label()
        )
    }
}

/// Receives one record per transition.
pub trait TransitionSink {
    /// Record a transition.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the record could not be written.
    fn record(&mut self, event: &TransitionEvent) -> io::Result<()>;
}

/// Writes each transition as a line and flushes immediately.
#[derive(Debug)]
pub struct LineSink<W> {
    writer: W,
}

impl<W: Write> LineSink<W> {
    /// Wrap a writer.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// The wrapped writer.
    pub const fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> TransitionSink for LineSink<W> {
    fn record(&mut self, event: &TransitionEvent) -> io::Result<()> {
        writeln!(self.writer, "{}", event.log_line())?;
        self.writer.flush()
    }
}

/// Boxed sink over stdout or a file.
pub type DynLineSink = LineSink<Box<dyn Write + Send>>;

/// Open the sink named by `destination`: `-` for stdout, otherwise a file
/// path that is created or truncated.
///
/// # Errors
///
/// Returns an error if the file cannot be created.
pub fn open_sink(destination: &str) -> io::Result<DynLineSink> {
    let writer: Box<dyn Write + Send> = if destination == STDOUT_DESTINATION {
        Box::new(io::stdout())
    } else {
        Box::new(File::create(Path::new(destination))?)
    };
    Ok(LineSink::new(writer))
}

/// Open the sink selected by `PROXLOCK_LOGFILE`, defaulting to stdout.
///
/// # Errors
///
/// Returns an error if the configured file cannot be created.
pub fn open_sink_from_env() -> io::Result<DynLineSink> {
    let destination = std::env::var(LOGFILE_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| STDOUT_DESTINATION.to_string());
    open_sink(&destination)
}
