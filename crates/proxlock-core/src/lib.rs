//! # proxlock-core
//!
//! Core logic for proxlock: lock the workstation session when a paired
//! Bluetooth device walks away, unlock it when the device comes back.
//!
//! This crate provides:
//! - The proximity monitor (poll loop and lock/unlock state machine)
//! - Bluetooth presence probing and device discovery
//! - Fire-and-forget lock/unlock command dispatch
//! - Settings loading, saving, and validation
//!
//! ## Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`monitor`] - The poll loop, debounce, and exactly-once command dispatch
//! - [`prober`] - The presence probe trait and its error type
//! - [`bluetooth`] - BlueZ-backed prober and discovery (feature `bluetooth`)
//! - [`command`] - Shell command launching and executable lookup
//! - [`transition`] - Transition events and the line-oriented log sink
//! - [`config`] - Settings and the per-run monitor configuration
//! - [`storage`] - The settings file on disk
//! - [`error`] - Unified error types for the crate
//! - [`types`] - Shared value types

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

#[cfg(feature = "bluetooth")]
pub mod bluetooth;
pub mod command;
pub mod config;
pub mod error;
pub mod monitor;
pub mod prober;
pub mod storage;
pub mod transition;
pub mod types;

// Re-export primary types for convenience
#[cfg(feature = "bluetooth")]
pub use bluetooth::BluerProber;
pub use command::{ensure_executable, resolve_executable, CommandLauncher, LaunchError, ShellLauncher};
pub use config::{desktop_commands, ConfigError, ConfigResult, MonitorConfig, Settings, MAX_DURATION_SECS};
pub use error::{ProxlockError, Result};
pub use monitor::{run, ProximityMonitor, PROBE_GRACE};
pub use prober::{PresenceProber, ProbeError, ProbeResult};
pub use storage::{default_config_path, SettingsStore};
pub use transition::{open_sink, open_sink_from_env, LineSink, TransitionEvent, TransitionSink};
pub use types::{is_valid_mac_address, BluetoothAddress, DiscoveredDevice, SessionState};
