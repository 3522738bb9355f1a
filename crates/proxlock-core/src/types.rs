//! Shared types.
//!
//! This module contains the small value types used across the crate: the
//! tracked device address, devices reported by discovery, and the session
//! lock state held by the monitor.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

static MAC_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}$").expect("static regex is valid")
});

/// Check whether a string is a Bluetooth hardware address (`XX:XX:XX:XX:XX:XX`).
#[must_use]
pub fn is_valid_mac_address(address: &str) -> bool {
    MAC_ADDRESS_RE.is_match(address)
}

/// A validated Bluetooth hardware address, normalised to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BluetoothAddress(String);

impl BluetoothAddress {
    /// The address in `AA:BB:CC:DD:EE:FF` form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BluetoothAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingTargetAddress);
        }
        if !is_valid_mac_address(trimmed) {
            return Err(ConfigError::ValidationError {
                field: "target_address".to_string(),
                message: format!("'{trimmed}' is not a Bluetooth address (expected XX:XX:XX:XX:XX:XX)"),
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for BluetoothAddress {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BluetoothAddress> for String {
    fn from(address: BluetoothAddress) -> Self {
        address.0
    }
}

impl fmt::Display for BluetoothAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A device reported during a discovery window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    /// Bluetooth hardware address.
    pub address: String,

    /// Advertised name, if the device broadcasts one.
    pub name: Option<String>,

    /// Signal strength in dBm.
    pub rssi: Option<i16>,
}

/// Lock state of the workstation session as tracked by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Session is locked; the next presence reading unlocks it.
    Locked,
    /// Session is unlocked; the next absence reading locks it.
    #[default]
    Unlocked,
}

impl SessionState {
    /// Label written to the transition log.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Locked => "LOCKED",
            Self::Unlocked => "UNLOCKED",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
