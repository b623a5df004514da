/// Background host metrics sampler
///
/// One long-lived task, spawned at startup and joined at shutdown. Each tick
/// collects a snapshot, validates it, and pushes it into the shared history
/// buffer. A slow collection delays the next tick; it is never skipped or
/// doubled. No failure in a cycle terminates the loop.
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::{HostMetricsCollector, MetricHistory};

/// Handle to the running sampler task.
pub struct SamplerHandle {
    shutdown_tx: watch::Sender<()>,
    handle: JoinHandle<()>,
}

impl SamplerHandle {
    /// Signal the sampler to stop and wait for an in-flight push to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(err) = self.handle.await {
            error!("Metrics sampler task terminated abnormally: {}", err);
        }
    }
}

/// Spawn the sampler loop. The first capture happens immediately.
pub fn spawn_sampler(history: Arc<MetricHistory>, period: Duration) -> SamplerHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(());

    info!(
        period_secs = period.as_secs(),
        "Starting host metrics sampler"
    );

    let handle = tokio::spawn(async move {
        let mut collector = HostMetricsCollector::new();
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Host metrics sampler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match collector.collect().validated() {
                        Ok(snapshot) => {
                            history.push(snapshot);
                            debug!(samples = history.len(), "Captured host metrics sample");
                        }
                        Err(err) => {
                            warn!("Discarding invalid metrics sample: {}", err);
                        }
                    }
                }
            }
        }
    });

    SamplerHandle {
        shutdown_tx,
        handle,
    }
}
