//! The proximity monitor: poll loop and two-state lock machine.
//!
//! Each cycle probes for the target device, compares the answer with the
//! current [`SessionState`], and launches the lock or unlock command only when
//! the state actually changes. Steady readings are no-ops, so a command runs
//! exactly once per transition regardless of how many cycles observe it.
//!
//! ```text
//!   Unlocked --(absent)--> Locked     [lock_command]
//!   Locked  --(present)--> Unlocked   [unlock_command]
//! ```
//!
//! The loop sleeps for the poll interval after every probe, including failed
//! ones. Both the probe and the sleep race against a [`CancellationToken`] so a
//! stop request is honoured without waiting out the cycle.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::CommandLauncher;
use crate::config::MonitorConfig;
use crate::error::{ProxlockError, Result};
use crate::prober::{PresenceProber, ProbeError, ProbeResult};
use crate::transition::{TransitionEvent, TransitionSink};
use crate::types::SessionState;

/// Slack added to the probe timeout before the monitor gives up on a probe.
pub const PROBE_GRACE: Duration = Duration::from_secs(2);

/// Owns the session state and its collaborators for one monitoring run.
pub struct ProximityMonitor<P, L, S> {
    config: MonitorConfig,
    prober: P,
    launcher: L,
    sink: S,
    state: SessionState,
}

impl<P, L, S> ProximityMonitor<P, L, S>
where
    P: PresenceProber,
    L: CommandLauncher,
    S: TransitionSink,
{
    /// Create a monitor after checking that both commands resolve on `PATH`.
    ///
    /// The session is assumed to start unlocked.
    ///
    /// # Errors
    ///
    /// Returns [`ProxlockError::Configuration`] if either command's program
    /// cannot be found.
    pub fn new(config: MonitorConfig, prober: P, launcher: L, sink: S) -> Result<Self> {
        config.check_commands()?;

        Ok(Self {
            config,
            prober,
            launcher,
            sink,
            state: SessionState::default(),
        })
    }

    /// Current session state.
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Configuration this monitor runs with.
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The command launcher.
    pub const fn launcher(&self) -> &L {
        &self.launcher
    }

    /// The transition sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Apply one presence reading.
    ///
    /// Launches a command and records a transition only if the reading
    /// disagrees with the current state. A command that fails to launch is
    /// logged; the state still changes.
    ///
    /// # Errors
    ///
    /// Returns [`ProxlockError::TransitionLog`] if the transition cannot be
    /// recorded.
    pub fn observe(&mut self, present: bool) -> Result<Option<TransitionEvent>> {
        let (next, command) = match (present, self.state) {
            (true, SessionState::Locked) => (SessionState::Unlocked, &self.config.unlock_command),
            (false, SessionState::Unlocked) => (SessionState::Locked, &self.config.lock_command),
            _ => return Ok(None),
        };

        if let Err(err) = self.launcher.launch(command) {
            warn!(error = %err, "Command did not start");
        }
        self.state = next;

        let event = TransitionEvent::now(next, command.as_str());
        info!(state = %next, command = %command, "Session state changed");
        self.sink
            .record(&event)
            .map_err(ProxlockError::TransitionLog)?;

        Ok(Some(event))
    }

    /// Probe for the target once, bounded by the probe timeout plus
    /// [`PROBE_GRACE`].
    ///
    /// # Errors
    ///
    /// Returns the prober's error, or [`ProbeError::Timeout`] if it overran.
    pub async fn probe(&self) -> ProbeResult<bool> {
        let address = &self.config.target_address;
        let limit = self.config.probe_timeout.saturating_add(PROBE_GRACE);

        tokio::time::timeout(limit, self.prober.probe(address, self.config.probe_timeout))
            .await
            .unwrap_or_else(|_| {
                Err(ProbeError::Timeout {
                    address: address.to_string(),
                    limit,
                })
            })
    }

    /// Run one probe-and-decide cycle without sleeping.
    ///
    /// A failed probe is logged and leaves the state untouched.
    ///
    /// # Errors
    ///
    /// Returns an error only if a transition could not be recorded.
    pub async fn poll_once(&mut self) -> Result<Option<TransitionEvent>> {
        match self.probe().await {
            Ok(present) => {
                debug!(present, state = %self.state, "Probe finished");
                self.observe(present)
            }
            Err(err) => {
                warn!(error = %err, state = %self.state, "Presence probe failed, keeping current state");
                Ok(None)
            }
        }
    }

    /// Poll until `cancel` fires.
    ///
    /// Returns `Ok(())` on cancellation. No command is launched once
    /// cancellation has been observed.
    ///
    /// # Errors
    ///
    /// Returns any unrecoverable error raised inside the loop.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<()> {
        info!(
            target_address = %self.config.target_address,
            poll_interval_secs = self.config.poll_interval.as_secs(),
            probe_timeout_secs = self.config.probe_timeout.as_secs(),
            "Monitoring started"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                cycle = self.poll_once() => { cycle?; }
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        info!(state = %self.state, "Monitoring stopped");
        Ok(())
    }
}

/// Validate `config` and monitor until `cancel` fires.
///
/// # Errors
///
/// Fails immediately with [`ProxlockError::Configuration`] if either command
/// does not resolve, before any probe or command runs. Otherwise returns the
/// first unrecoverable error raised by the loop.
pub async fn run<P, L, S>(
    config: MonitorConfig,
    prober: P,
    launcher: L,
    sink: S,
    cancel: &CancellationToken,
) -> Result<()>
where
    P: PresenceProber,
    L: CommandLauncher,
    S: TransitionSink,
{
    let mut monitor = ProximityMonitor::new(config, prober, launcher, sink)?;
    monitor.run(cancel).await
}
