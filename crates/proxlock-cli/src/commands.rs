//! Subcommand handlers.

use std::io::{self, Write};

use proxlock_core::{MonitorConfig, ProxlockError};

use crate::context::AppContext;
use crate::prompt;

/// Interactively edit the lock commands and timings, then save.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or the settings cannot be saved.
pub fn configure(ctx: &mut AppContext) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let updated = prompt::edit_settings(ctx.saved(), &mut input, &mut output)?;
    ctx.update(updated)?;

    writeln!(output, "Configuration saved.")?;
    Ok(())
}

/// Build the monitor configuration and check both commands resolve on `PATH`.
///
/// Runs before the adapter or the transition log is touched, so a bad
/// command is always reported as a configuration error.
///
/// # Errors
///
/// Returns [`ProxlockError::Configuration`] for invalid settings or a
/// command that cannot be found.
pub fn monitor_config(ctx: &AppContext) -> Result<MonitorConfig, ProxlockError> {
    let config = ctx.settings().to_monitor_config()?;
    config.check_commands()?;
    Ok(config)
}

#[cfg(feature = "bluetooth")]
mod bluetooth {
    use std::io;

    use anyhow::Context;
    use proxlock_core::{BluerProber, PresenceProber, ShellLauncher};
    use tracing::info;

    use super::{monitor_config, AppContext, ProxlockError};
    use crate::{prompt, signals};

    fn ask_device_name() -> anyhow::Result<String> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();

        prompt::ask(&mut input, &mut output, "Enter the name of the device to search")?
            .context("No device name given")
    }

    /// Discover a device by name and store its address.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or the settings cannot be saved.
    pub async fn scan(ctx: &mut AppContext, name: Option<String>) -> anyhow::Result<()> {
        let name = match name {
            Some(name) => name,
            None => ask_device_name()?,
        };
        let duration = ctx.settings().discover_duration();

        let prober = BluerProber::new().await.map_err(ProxlockError::from)?;
        info!(name = %name, seconds = duration.as_secs(), "Scanning for device");
        let found = prober
            .find_by_name(&name, duration)
            .await
            .map_err(ProxlockError::from)?;

        let Some(device) = found else {
            println!("Device not found.");
            return Ok(());
        };

        println!("Device found: {}", device.address);
        let mut settings = ctx.saved().clone();
        settings.target_address = device.address;
        ctx.update(settings)
            .context("Failed to save the device address")?;
        println!("Address saved to configuration file.");
        Ok(())
    }

    /// Run the proximity monitor until interrupted.
    ///
    /// # Errors
    ///
    /// Returns a configuration error before monitoring starts, or the
    /// unrecoverable error that ended it.
    pub async fn start(ctx: &AppContext) -> anyhow::Result<()> {
        let config = monitor_config(ctx)?;

        let prober = BluerProber::new().await.map_err(ProxlockError::from)?;
        let sink = proxlock_core::open_sink_from_env()
            .map_err(ProxlockError::from)
            .context("Failed to open transition log")?;
        let cancel = signals::shutdown_token();

        proxlock_core::run(config, prober, ShellLauncher, sink, &cancel).await?;

        println!("Monitoring stopped by user.");
        Ok(())
    }

    /// Probe the configured device once and print the answer.
    ///
    /// # Errors
    ///
    /// Returns an error if no device is configured or the probe fails.
    pub async fn probe(ctx: &AppContext) -> anyhow::Result<()> {
        let config = ctx
            .settings()
            .to_monitor_config()
            .map_err(ProxlockError::from)?;

        let prober = BluerProber::new().await.map_err(ProxlockError::from)?;
        let present = prober
            .probe(&config.target_address, config.probe_timeout)
            .await
            .map_err(ProxlockError::from)?;

        println!("{}", if present { "present" } else { "absent" });
        Ok(())
    }
}

#[cfg(feature = "bluetooth")]
pub use bluetooth::{probe, scan, start};

#[cfg(not(feature = "bluetooth"))]
mod unsupported {
    use super::AppContext;

    const MESSAGE: &str = "proxlock was built without Bluetooth support (enable the `bluetooth` feature)";

    /// Unavailable without the `bluetooth` feature.
    ///
    /// # Errors
    ///
    /// Always.
    pub async fn scan(_ctx: &mut AppContext, _name: Option<String>) -> anyhow::Result<()> {
        anyhow::bail!(MESSAGE)
    }

    /// Unavailable without the `bluetooth` feature.
    ///
    /// # Errors
    ///
    /// Always.
    pub async fn start(_ctx: &AppContext) -> anyhow::Result<()> {
        anyhow::bail!(MESSAGE)
    }

    /// Unavailable without the `bluetooth` feature.
    ///
    /// # Errors
    ///
    /// Always.
    pub async fn probe(_ctx: &AppContext) -> anyhow::Result<()> {
        anyhow::bail!(MESSAGE)
    }
}

#[cfg(not(feature = "bluetooth"))]
pub use unsupported::{probe, scan, start};

/// Process exit code for an error returned by a subcommand.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<ProxlockError>()
        .map_or(1, |e| u8::try_from(e.exit_code()).unwrap_or(1))
}
