//! Transport-agnostic sending capability for one subscriber.

use crate::error::DeliveryError;
use tokio::sync::mpsc;

/// A frame queued for a subscriber's transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A serialised JSON record.
    Text(String),
    /// A liveness probe; the transport answers with its own pong.
    Ping,
}

/// Non-blocking send capability held by the registry for each subscriber.
///
/// Implementations must never wait on the peer: a send that cannot complete
/// immediately is reported as [`DeliveryError::Backpressure`].
pub trait SubscriberHandle: Send + Sync {
    fn try_send(&self, frame: Outbound) -> Result<(), DeliveryError>;
}

impl SubscriberHandle for mpsc::Sender<Outbound> {
    fn try_send(&self, frame: Outbound) -> Result<(), DeliveryError> {
        mpsc::Sender::try_send(self, frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}
