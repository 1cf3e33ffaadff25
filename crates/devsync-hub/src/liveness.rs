//! Periodic liveness sweep over the connection registry.
//!
//! Each connection moves through `ALIVE -> AWAITING -> ALIVE` as probes are
//! sent and answered. A connection still `AWAITING` when the next sweep runs
//! is evicted, so an unresponsive subscriber is gone at most one interval
//! after the probe it missed.

use crate::handle::Outbound;
use crate::registry::{ConnectionId, ConnectionRegistry};
use std::time::Duration;

/// Sweep interval used when none is configured.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Result of a single sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Connections that were sent a fresh probe.
    pub probed: usize,
    /// Connections removed, either for missing the last probe or because the
    /// new probe could not be sent.
    pub evicted: Vec<ConnectionId>,
}

/// Probes and evicts subscribers on a fixed interval.
#[derive(Clone)]
pub struct LivenessMonitor {
    registry: ConnectionRegistry,
    interval: Duration,
}

impl LivenessMonitor {
    pub fn new(registry: ConnectionRegistry, interval: Duration) -> Self {
        Self { registry, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one sweep over a snapshot of the registry.
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();

        for connection in self.registry.snapshot().await {
            if !connection.take_alive() {
                tracing::info!(
                    connection_id = %connection.id(),
                    "evicting subscriber that missed its liveness probe"
                );
                report.evicted.push(connection.id());
                continue;
            }

            match connection.try_send(Outbound::Ping) {
                Ok(()) => report.probed += 1,
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection.id(),
                        "evicting subscriber after failed probe: {}",
                        e
                    );
                    report.evicted.push(connection.id());
                }
            }
        }

        for id in &report.evicted {
            self.registry.unregister(*id).await;
        }
        report
    }

    /// Sweeps forever. Spawn this on the runtime.
    pub async fn run(self) {
        if self.interval.is_zero() {
            tracing::warn!("liveness sweep disabled (interval=0)");
            return;
        }

        tracing::info!(
            interval_secs = self.interval.as_secs_f64(),
            "starting subscriber liveness sweep"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; probing starts one interval in.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let report = self.sweep().await;
            if !report.evicted.is_empty() {
                tracing::info!(
                    probed = report.probed,
                    evicted = report.evicted.len(),
                    "liveness sweep evicted subscribers"
                );
            }
        }
    }
}
