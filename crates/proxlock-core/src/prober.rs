//! Presence probing.
//!
//! A [`PresenceProber`] answers one question within a bounded time: is the
//! device with this address reachable right now? The monitor only depends on
//! this trait; the BlueZ implementation lives in [`crate::bluetooth`].

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::types::BluetoothAddress;

/// Errors from a presence probe or a discovery scan.
///
/// During monitoring these are recoverable: the cycle is skipped and the
/// next poll tries again.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No Bluetooth adapter was found on this system.
    #[error(
        "No Bluetooth adapter found. Ensure Bluetooth hardware is present and bluetoothd is running."
    )]
    AdapterNotFound,

    /// The adapter exists but is powered off.
    #[error("Bluetooth adapter is powered off. Run 'bluetoothctl power on' to enable.")]
    AdapterPoweredOff,

    /// The probe did not return within its time limit.
    #[error("Probe for {address} did not finish within {} seconds", limit.as_secs())]
    Timeout {
        /// Address that was being probed.
        address: String,
        /// Time limit that was exceeded.
        limit: Duration,
    },

    /// The Bluetooth session could not be established.
    #[error("Failed to open Bluetooth session: {message}")]
    SessionInitFailed {
        /// Error reported by the Bluetooth stack.
        message: String,
    },

    /// The device could not be paged for a reason other than being out of range.
    #[error("Could not reach {address}: {message}")]
    ConnectFailed {
        /// Address that was being probed.
        address: String,
        /// Error reported by the socket layer.
        message: String,
    },

    /// Discovery failed while scanning.
    #[error("Bluetooth discovery failed: {message}")]
    DiscoveryFailed {
        /// Error reported by the Bluetooth stack.
        message: String,
    },
}

/// Result alias for probe operations.
pub type ProbeResult<T> = std::result::Result<T, ProbeError>;

/// Bounded-time reachability check for a single device.
pub trait PresenceProber {
    /// Report whether `address` is reachable, waiting at most `timeout`.
    ///
    /// Not seeing the device within `timeout` is `Ok(false)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] if the radio or Bluetooth stack fails.
    fn probe(
        &self,
        address: &BluetoothAddress,
        timeout: Duration,
    ) -> impl Future<Output = ProbeResult<bool>> + Send;
}
