use std::future::Future;

use chrono::Utc;
use tracing::info;

use crate::adapters::feed_client::FeedClient;
use crate::adapters::object_store::ObjectStore;
use crate::config::ServiceConfig;
use crate::handlers::cycle::run_cycle;

/// Runs cycles back to back, waiting the configured interval after each one,
/// until `shutdown` resolves. Returns the number of cycles run.
///
/// A cycle in progress always runs to its end; shutdown is only observed while
/// waiting for the next cycle. With `run_once` set exactly one cycle runs.
pub async fn run_schedule(
    config: &ServiceConfig,
    feed_client: &impl FeedClient,
    store: &impl ObjectStore,
    shutdown: impl Future<Output = ()>,
) -> u64 {
    tokio::pin!(shutdown);
    let mut cycle = 0u64;

    loop {
        cycle += 1;
        // Outcomes are already logged by the driver; any ending reschedules.
        run_cycle(cycle, config, feed_client, store).await;

        if config.schedule.run_once {
            info!(event = "run_once_finished", cycles = cycle);
            return cycle;
        }

        let next_cycle_at = chrono::Duration::from_std(config.schedule.interval)
            .ok()
            .and_then(|interval| Utc::now().checked_add_signed(interval));
        info!(
            event = "next_cycle_scheduled",
            cycle = cycle + 1,
            wait_secs = config.schedule.interval.as_secs(),
            next_cycle_at = ?next_cycle_at,
        );

        tokio::select! {
            _ = &mut shutdown => {
                info!(event = "shutdown_requested", cycles = cycle);
                return cycle;
            }
            _ = tokio::time::sleep(config.schedule.interval) => {}
        }
    }
}

/// Registers the interrupt and terminate handlers right away and returns a
/// future that resolves on the first signal received after this call.
///
/// Registration happens before the future is first polled, so a signal that
/// arrives while a cycle is running is held until the scheduler next waits.
#[cfg(unix)]
pub fn install_shutdown_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => info!(event = "shutdown_signal", signal = "SIGINT"),
            _ = terminate.recv() => info!(event = "shutdown_signal", signal = "SIGTERM"),
        }
    })
}

#[cfg(not(unix))]
pub fn install_shutdown_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    let (signalled, received) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = signalled.send(());
            }
            Err(error) => {
                tracing::warn!(event = "signal_handler_failed", error = %error, "running without shutdown signal");
            }
        }
    });
    Ok(async move {
        if received.await.is_ok() {
            info!(event = "shutdown_signal", signal = "ctrl-c");
        } else {
            std::future::pending::<()>().await;
        }
    })
}
