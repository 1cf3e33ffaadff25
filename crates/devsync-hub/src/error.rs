//! Error types for the broadcast hub.

/// Failure to hand a frame to a single subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The subscriber's transport has gone away.
    #[error("subscriber channel closed")]
    Closed,

    /// The subscriber's outbound queue is full.
    #[error("subscriber outbound queue is full")]
    Backpressure,
}

/// Errors surfaced to producers and subscribers of the hub.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The producer sent an event that cannot be accepted.
    #[error("malformed event payload: {0}")]
    MalformedEvent(String),

    /// An outgoing record could not be serialised.
    #[error("hub serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The welcome record could not be delivered to a new subscriber.
    #[error("failed to greet subscriber: {0}")]
    Greeting(#[source] DeliveryError),
}
