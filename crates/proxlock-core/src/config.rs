//! Application configuration.
//!
//! Handles the persisted [`Settings`] record and its conversion into the
//! immutable [`MonitorConfig`] used for one monitoring run:
//! - Bluetooth device to track
//! - Lock and unlock shell commands
//! - Poll interval and probe (discovery) timeout

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::ensure_executable;
use crate::types::BluetoothAddress;

/// Default seconds between proximity checks.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default seconds a single probe or discovery window may take.
pub const DEFAULT_DISCOVER_SECS: u64 = 25;

/// Upper bound for the poll interval and the probe timeout (one day).
pub const MAX_DURATION_SECS: u64 = 86_400;

/// Errors raised while loading, saving, or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No target device has been configured yet.
    #[error("No Bluetooth device configured. Run `proxlock scan` to choose one.")]
    MissingTargetAddress,

    /// A field holds a value the monitor cannot use.
    #[error("Invalid value for {field}: {message}")]
    ValidationError {
        /// Settings key that failed validation.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A lock or unlock command does not resolve to an executable.
    #[error("{field} '{command}' is not a valid command: '{program}' was not found on PATH")]
    CommandNotFound {
        /// Which command failed (`lock_command` or `unlock_command`).
        field: &'static str,
        /// The full command line as configured.
        command: String,
        /// The program name that was looked up.
        program: String,
    },

    /// The settings file could not be read or parsed.
    #[error("Failed to read {}: {source}", path.display())]
    ReadError {
        /// Settings file path.
        path: PathBuf,
        /// Underlying loader error.
        #[source]
        source: ::config::ConfigError,
    },

    /// The settings file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    WriteError {
        /// Settings file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Settings could not be serialized to TOML.
    #[error("Failed to serialize settings: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// No platform configuration directory could be determined.
    #[error("Cannot determine config directory. Set PROXLOCK_CONFIG to a file path.")]
    NoConfigDir,
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Persisted settings, as stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bluetooth hardware address of the tracked device. Empty until `scan` runs.
    pub target_address: String,

    /// Shell command that locks the session.
    pub lock_command: String,

    /// Shell command that unlocks the session.
    pub unlock_command: String,

    /// Seconds to sleep between proximity checks.
    pub poll_interval_secs: u64,

    /// Seconds a presence probe or device discovery may take.
    pub discover_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::for_desktop("")
    }
}

impl Settings {
    /// Defaults with lock commands chosen for the given desktop
    /// (an `XDG_CURRENT_DESKTOP` value).
    #[must_use]
    pub fn for_desktop(desktop: &str) -> Self {
        let (lock, unlock) = desktop_commands(desktop);
        Self {
            target_address: String::new(),
            lock_command: lock.to_string(),
            unlock_command: unlock.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            discover_secs: DEFAULT_DISCOVER_SECS,
        }
    }

    /// Defaults for the desktop named by `XDG_CURRENT_DESKTOP`.
    #[must_use]
    pub fn from_environment_desktop() -> Self {
        let desktop = std::env::var("XDG_CURRENT_DESKTOP").unwrap_or_default();
        Self::for_desktop(&desktop)
    }

    /// Discovery window used by `scan`.
    #[must_use]
    pub const fn discover_duration(&self) -> Duration {
        Duration::from_secs(self.discover_secs)
    }

    /// Validate these settings and build the configuration for a monitoring run.
    ///
    /// Executable lookup of the commands is not done here; the monitor
    /// performs it as its start-up precondition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTargetAddress`] if no device is configured,
    /// or [`ConfigError::ValidationError`] for malformed addresses, empty
    /// commands, and durations of zero or above [`MAX_DURATION_SECS`].
    pub fn to_monitor_config(&self) -> ConfigResult<MonitorConfig> {
        let target_address: BluetoothAddress = self.target_address.parse()?;

        let lock_command = non_empty_command("lock_command", &self.lock_command)?;
        let unlock_command = non_empty_command("unlock_command", &self.unlock_command)?;

        Ok(MonitorConfig {
            target_address,
            lock_command,
            unlock_command,
            poll_interval: positive_secs("poll_interval_secs", self.poll_interval_secs)?,
            probe_timeout: positive_secs("discover_secs", self.discover_secs)?,
        })
    }
}

/// Configuration for one monitoring run. Immutable once the loop starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Device whose presence keeps the session unlocked.
    pub target_address: BluetoothAddress,

    /// Shell command run when the device goes away.
    pub lock_command: String,

    /// Shell command run when the device comes back.
    pub unlock_command: String,

    /// Sleep between the end of one probe and the start of the next.
    pub poll_interval: Duration,

    /// Upper bound for a single presence probe.
    pub probe_timeout: Duration,
}

impl MonitorConfig {
    /// Check that both commands name a program found on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CommandNotFound`] for the first command whose
    /// program does not resolve.
    pub fn check_commands(&self) -> ConfigResult<()> {
        ensure_executable("lock_command", &self.lock_command)?;
        ensure_executable("unlock_command", &self.unlock_command)?;
        Ok(())
    }
}

/// Lock and unlock commands for a desktop environment.
///
/// Matching is a case-insensitive substring test, so values such as
/// `ubuntu:GNOME` resolve to the GNOME commands.
#[must_use]
pub fn desktop_commands(desktop: &str) -> (&'static str, &'static str) {
    let desktop = desktop.to_ascii_uppercase();
    if desktop.contains("GNOME") {
        (
            "gnome-screensaver-command --lock",
            "gnome-screensaver-command -d",
        )
    } else if desktop.contains("SWAY") {
        ("swaylock", "pkill -USR1 swaylock")
    } else {
        ("loginctl lock-session", "loginctl unlock-session")
    }
}

fn non_empty_command(field: &str, command: &str) -> ConfigResult<String> {
    let command = command.trim();
    if command.is_empty() {
        return Err(ConfigError::ValidationError {
            field: field.to_string(),
            message: "command cannot be empty".to_string(),
        });
    }
    Ok(command.to_string())
}

fn positive_secs(field: &str, secs: u64) -> ConfigResult<Duration> {
    let message = match secs {
        0 => "must be at least 1 second".to_string(),
        secs if secs > MAX_DURATION_SECS => {
            format!("must be at most {MAX_DURATION_SECS} seconds")
        }
        secs => return Ok(Duration::from_secs(secs)),
    };
    Err(ConfigError::ValidationError {
        field: field.to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Settings {
        Settings {
            target_address: "aa:bb:cc:dd:ee:ff".to_string(),
            ..Settings::for_desktop("")
        }
    }

    #[test]
    fn test_desktop_defaults() {
        assert_eq!(
            desktop_commands("ubuntu:GNOME"),
            (
                "gnome-screensaver-command --lock",
                "gnome-screensaver-command -d"
            )
        );
        assert_eq!(
            desktop_commands("sway"),
            ("swaylock", "pkill -USR1 swaylock")
        );
        assert_eq!(
            desktop_commands("KDE"),
            ("loginctl lock-session", "loginctl unlock-session")
        );
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.target_address.is_empty());
        assert_eq!(settings.poll_interval_secs, 5);
        assert_eq!(settings.discover_secs, 25);
        assert_eq!(settings.lock_command, "loginctl lock-session");
    }

    #[test]
    fn test_to_monitor_config() {
        let config = configured().to_monitor_config().unwrap();
        assert_eq!(config.target_address.as_str(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.probe_timeout, Duration::from_secs(25));
        assert_eq!(config.lock_command, "loginctl lock-session");
    }

    #[test]
    fn test_missing_address_is_rejected() {
        let err = Settings::default().to_monitor_config().unwrap_err();
        assert!(matches!(err, ConfigError::MissingTargetAddress));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let settings = Settings {
            poll_interval_secs: 0,
            ..configured()
        };
        let err = settings.to_monitor_config().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { ref field, .. } if field == "poll_interval_secs")
        );
    }

    #[test]
    fn test_oversized_durations_are_rejected() {
        let settings = Settings {
            discover_secs: u64::MAX,
            ..configured()
        };
        let err = settings.to_monitor_config().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { ref field, .. } if field == "discover_secs")
        );

        let settings = Settings {
            poll_interval_secs: MAX_DURATION_SECS + 1,
            ..configured()
        };
        let err = settings.to_monitor_config().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { ref field, .. } if field == "poll_interval_secs")
        );

        let settings = Settings {
            discover_secs: MAX_DURATION_SECS,
            ..configured()
        };
        assert!(settings.to_monitor_config().is_ok());
    }

    #[test]
    fn test_blank_command_is_rejected() {
        let settings = Settings {
            unlock_command: "   ".to_string(),
            ..configured()
        };
        let err = settings.to_monitor_config().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { ref field, .. } if field == "unlock_command")
        );
    }

    #[test]
    fn test_check_commands() {
        let config = MonitorConfig {
            lock_command: "true --lock".to_string(),
            unlock_command: "true".to_string(),
            ..configured().to_monitor_config().unwrap()
        };
        assert!(config.check_commands().is_ok());

        let config = MonitorConfig {
            unlock_command: "proxlock-no-such-unlocker now".to_string(),
            ..config
        };
        let err = config.check_commands().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::CommandNotFound { field: "unlock_command", ref program, .. }
                if program == "proxlock-no-such-unlocker"
        ));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings: Settings = toml::from_str("target_address = \"AA:BB:CC:DD:EE:FF\"").unwrap();
        assert_eq!(settings.target_address, "AA:BB:CC:DD:EE:FF");
        assert_eq!(settings.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
    }
}
