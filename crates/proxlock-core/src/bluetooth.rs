//! Bluetooth presence probing and device discovery via BlueZ.
//!
//! This module provides functionality to:
//! - Open the default adapter through `bluer`
//! - Check whether one device is currently in range (a bounded page)
//! - List nearby devices, or find one by its advertised name, for `scan`
//!
//! Presence is checked by paging the device: an L2CAP connection attempt to
//! its SDP channel, like `l2ping`. A paired phone answers pages even when it
//! is not discoverable. Any answer from the remote, including a refusal,
//! means it is in range.

use std::io;
use std::time::Duration;

use bluer::l2cap::{SocketAddr, Stream};
use bluer::{Adapter, AdapterEvent, Address, AddressType, Session};
use futures::{pin_mut, StreamExt};
use tracing::{debug, info, trace};

use crate::prober::{PresenceProber, ProbeError, ProbeResult};
use crate::types::{BluetoothAddress, DiscoveredDevice};

/// L2CAP PSM of the Service Discovery Protocol, open on every BR/EDR device.
const SDP_PSM: u16 = 1;

// Linux errno values the standard library has no stable `ErrorKind` for.
const EHOSTDOWN: i32 = 112;
const EHOSTUNREACH: i32 = 113;

impl From<bluer::Error> for ProbeError {
    fn from(err: bluer::Error) -> Self {
        Self::DiscoveryFailed {
            message: err.to_string(),
        }
    }
}

/// Presence prober backed by the default BlueZ adapter.
pub struct BluerProber {
    _session: Session,
    adapter: Adapter,
}

impl BluerProber {
    /// Connect to BlueZ and select the default adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if bluetoothd is unreachable, no adapter exists, or
    /// the adapter is powered off.
    pub async fn new() -> ProbeResult<Self> {
        let session = Session::new()
            .await
            .map_err(|e| ProbeError::SessionInitFailed {
                message: e.to_string(),
            })?;
        let adapter = session.default_adapter().await.map_err(|e| match e.kind {
            bluer::ErrorKind::NotFound => ProbeError::AdapterNotFound,
            _ => ProbeError::SessionInitFailed {
                message: e.to_string(),
            },
        })?;

        if !adapter.is_powered().await? {
            return Err(ProbeError::AdapterPoweredOff);
        }

        info!(adapter = adapter.name(), "Using Bluetooth adapter");

        Ok(Self {
            _session: session,
            adapter,
        })
    }

    /// Run discovery for `duration` and return every device seen in range.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery cannot be started or device properties
    /// cannot be read.
    pub async fn discover(&self, duration: Duration) -> ProbeResult<Vec<DiscoveredDevice>> {
        let events = self.adapter.discover_devices().await?;
        pin_mut!(events);

        let mut seen: Vec<Address> = Vec::new();
        let _ = tokio::time::timeout(duration, async {
            while let Some(event) = events.next().await {
                if let AdapterEvent::DeviceAdded(address) = event {
                    if !seen.contains(&address) {
                        seen.push(address);
                    }
                }
            }
        })
        .await;

        let mut devices = Vec::with_capacity(seen.len());
        for address in seen {
            let device = self.adapter.device(address)?;
            let rssi = device.rssi().await?;
            if rssi.is_none() {
                continue;
            }
            devices.push(DiscoveredDevice {
                address: address.to_string(),
                name: device.name().await?,
                rssi,
            });
        }

        debug!(count = devices.len(), "Discovery finished");
        Ok(devices)
    }

    /// Find the first in-range device whose advertised name is exactly `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails.
    pub async fn find_by_name(
        &self,
        name: &str,
        duration: Duration,
    ) -> ProbeResult<Option<DiscoveredDevice>> {
        let devices = self.discover(duration).await?;
        Ok(devices
            .into_iter()
            .find(|device| device.name.as_deref() == Some(name)))
    }
}

impl PresenceProber for BluerProber {
    async fn probe(&self, address: &BluetoothAddress, timeout: Duration) -> ProbeResult<bool> {
        let target: Address =
            address
                .as_str()
                .parse()
                .map_err(|e: bluer::InvalidAddress| ProbeError::DiscoveryFailed {
                    message: e.to_string(),
                })?;
        let socket = SocketAddr::new(target, AddressType::BrEdr, SDP_PSM);

        match tokio::time::timeout(timeout, Stream::connect(socket)).await {
            Ok(attempt) => page_outcome(address, attempt.map(drop)),
            Err(_) => {
                trace!(%address, "Page timed out");
                Ok(false)
            }
        }
    }
}

/// Interpret the result of a page attempt.
///
/// A connection, or a refusal or reset sent by the remote, means it answered.
/// Host-down, unreachable, and timeout errors mean it is out of range. Anything
/// else is a local failure.
fn page_outcome(address: &BluetoothAddress, attempt: io::Result<()>) -> ProbeResult<bool> {
    let Err(err) = attempt else {
        return Ok(true);
    };

    match err.kind() {
        io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => Ok(true),
        io::ErrorKind::TimedOut => Ok(false),
        _ if matches!(err.raw_os_error(), Some(EHOSTDOWN | EHOSTUNREACH)) => Ok(false),
        _ => Err(ProbeError::ConnectFailed {
            address: address.to_string(),
            message: err.to_string(),
        }),
    }
}
