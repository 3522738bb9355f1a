//! Unified error type for the proxlock core library.
//!
//! Each module has its own error type ([`ConfigError`], [`ProbeError`],
//! [`LaunchError`](crate::command::LaunchError)) for internal use;
//! [`ProxlockError`] is what the monitor and its callers see.
//!
//! # Taxonomy
//!
//! - **Configuration** errors are fatal: monitoring never starts.
//! - **Probe** errors are recoverable inside the poll loop and only surface
//!   here from one-shot operations such as opening the adapter.
//! - **Transition log** failures are unexpected and end the loop.
//!
//! User cancellation is not an error: [`crate::monitor::run`] returns `Ok(())`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::prober::ProbeError;

/// The unified error type for proxlock operations.
#[derive(Debug, Error)]
pub enum ProxlockError {
    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// Settings are missing, malformed, or name commands that cannot run.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    // =========================================================================
    // BLUETOOTH ERRORS
    // =========================================================================
    /// A probe or discovery failed.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    // =========================================================================
    // UNEXPECTED ERRORS
    // =========================================================================
    /// The transition log could not be written.
    #[error("Failed to write transition log: {0}")]
    TransitionLog(#[source] std::io::Error),

    /// A low-level I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A specialized [`Result`] type for proxlock operations.
pub type Result<T> = std::result::Result<T, ProxlockError>;

impl ProxlockError {
    /// Returns `true` if this error is related to configuration.
    #[inline]
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns `true` if this error is related to Bluetooth operations.
    #[inline]
    #[must_use]
    pub const fn is_bluetooth_error(&self) -> bool {
        matches!(self, Self::Probe(_))
    }

    /// Returns `true` if the poll loop can carry on after this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Probe(
                ProbeError::Timeout { .. }
                    | ProbeError::ConnectFailed { .. }
                    | ProbeError::DiscoveryFailed { .. }
            )
        )
    }

    /// Process exit code for this error.
    #[inline]
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 2,
            Self::Probe(_) | Self::TransitionLog(_) | Self::IoError(_) => 1,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(ConfigError::MissingTargetAddress) => "TARGET_NOT_CONFIGURED",
            Self::Configuration(ConfigError::CommandNotFound { .. }) => "COMMAND_NOT_FOUND",
            Self::Configuration(_) => "CONFIG_ERROR",
            Self::Probe(ProbeError::AdapterNotFound) => "BLUETOOTH_ADAPTER_NOT_FOUND",
            Self::Probe(ProbeError::AdapterPoweredOff) => "BLUETOOTH_ADAPTER_POWERED_OFF",
            Self::Probe(_) => "BLUETOOTH_PROBE_FAILED",
            Self::TransitionLog(_) => "TRANSITION_LOG_FAILED",
            Self::IoError(_) => "IO_ERROR",
        }
    }
}
