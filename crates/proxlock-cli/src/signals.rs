//! Shutdown signal handling.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Token cancelled on the first SIGINT or SIGTERM (Ctrl+C elsewhere).
///
/// Must be called from within a Tokio runtime.
#[must_use]
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.cancel();
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(mut sigint), Ok(mut sigterm)) => {
            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, initiating shutdown...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, initiating shutdown...");
                }
            }
        }
        _ => {
            warn!("Could not install SIGINT/SIGTERM handlers, falling back to Ctrl+C");
            wait_for_ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl+C handler unavailable, shutdown by signal disabled");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, initiating shutdown...");
}
