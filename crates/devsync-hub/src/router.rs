//! Fan-out of events to every registered subscriber.

use crate::error::HubError;
use crate::event::{Event, Welcome};
use crate::handle::{Outbound, SubscriberHandle};
use crate::registry::{ConnectionId, ConnectionRegistry};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one [`Hub::emit`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    /// Connections in the snapshot the event was offered to.
    pub attempted: usize,
    /// Connections that accepted the event.
    pub delivered: usize,
    /// Connections evicted because the send failed.
    pub evicted: Vec<ConnectionId>,
}

impl DeliveryReport {
    pub fn failed(&self) -> usize {
        self.evicted.len()
    }

    /// True when there was at least one subscriber and none accepted.
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.delivered == 0
    }
}

/// Broadcast router and subscription entry point.
#[derive(Clone)]
pub struct Hub {
    registry: ConnectionRegistry,
    welcome: Arc<str>,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    pub fn new() -> Self {
        Self::with_welcome(Welcome::default())
    }

    /// Creates a hub that greets subscribers with a custom message.
    pub fn with_welcome(welcome: Welcome) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            welcome: welcome.message.into(),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Greets a new subscriber and registers it.
    ///
    /// The greeting is queued before the subscriber becomes visible to
    /// [`emit`](Self::emit), so it is always the first record received.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Greeting`] if the greeting cannot be queued; the
    /// subscriber is not registered in that case.
    pub async fn subscribe(
        &self,
        handle: Arc<dyn SubscriberHandle>,
    ) -> Result<ConnectionId, HubError> {
        let greeting = serde_json::to_string(&Welcome {
            message: self.welcome.to_string(),
        })?;
        handle
            .try_send(Outbound::Text(greeting))
            .map_err(HubError::Greeting)?;

        let id = self.registry.register(handle).await;
        tracing::info!(connection_id = %id, "subscriber connected");
        Ok(id)
    }

    /// Removes a subscriber that went away on its own.
    pub async fn unsubscribe(&self, id: ConnectionId) {
        if self.registry.unregister(id).await {
            tracing::info!(connection_id = %id, "subscriber disconnected");
        }
    }

    /// Records a liveness probe response from a subscriber.
    pub async fn acknowledge(&self, id: ConnectionId) -> bool {
        self.registry.mark_alive(id).await
    }

    /// Offers `event` to every connection in the current snapshot.
    ///
    /// Sends never wait on a subscriber. Any connection whose send fails is
    /// evicted at once and listed in the report; the remaining connections
    /// are unaffected.
    ///
    /// # Errors
    ///
    /// Only fails if the event cannot be serialised.
    pub async fn emit(&self, event: &Event) -> Result<DeliveryReport, HubError> {
        let payload = serde_json::to_string(event)?;
        let snapshot = self.registry.snapshot().await;

        let mut report = DeliveryReport {
            attempted: snapshot.len(),
            ..DeliveryReport::default()
        };

        for connection in &snapshot {
            match connection.try_send(Outbound::Text(payload.clone())) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection.id(),
                        kind = %event.kind,
                        "evicting subscriber after failed delivery: {}",
                        e
                    );
                    report.evicted.push(connection.id());
                }
            }
        }
        drop(snapshot);

        for id in &report.evicted {
            self.registry.unregister(*id).await;
        }

        tracing::debug!(
            kind = %event.kind,
            subject = %event.subject,
            attempted = report.attempted,
            delivered = report.delivered,
            evicted = report.failed(),
            "event broadcast"
        );
        Ok(report)
    }
}
