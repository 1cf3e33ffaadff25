//! Live event broadcast hub for DevSync.
//!
//! Producers hand an [`Event`] to the [`Hub`], which fans it out to every
//! subscriber currently held by the [`ConnectionRegistry`]. Subscribers are
//! transport-agnostic: anything implementing [`SubscriberHandle`] can be
//! registered, and the WebSocket server registers the sending half of a
//! bounded per-connection queue.
//!
//! # Delivery model
//!
//! - Delivery is best-effort and at-most-once. Nothing is replayed to a
//!   subscriber that connects late.
//! - Each new subscriber receives one [`Welcome`] record before any event.
//! - Events reach a given subscriber in `emit` order.
//! - A failed send evicts that subscriber immediately and never affects the
//!   others.
//!
//! # Liveness
//!
//! The [`LivenessMonitor`] probes every subscriber on a fixed interval. A
//! subscriber that has not answered the previous probe by the next sweep is
//! evicted.

mod error;
mod event;
mod handle;
mod liveness;
mod registry;
mod router;

pub use error::{DeliveryError, HubError};
pub use event::{kinds, EmitRequest, Event, Welcome, WELCOME_MESSAGE};
pub use handle::{Outbound, SubscriberHandle};
pub use liveness::{LivenessMonitor, SweepReport, DEFAULT_SWEEP_INTERVAL};
pub use registry::{Connection, ConnectionId, ConnectionRegistry};
pub use router::{DeliveryReport, Hub};
