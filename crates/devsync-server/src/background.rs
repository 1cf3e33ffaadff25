//! Background tasks for the DevSync server.
//!
//! Includes:
//! - Sweeping unresponsive WebSocket subscribers.

use crate::AppState;
use devsync_hub::LivenessMonitor;
use std::sync::Arc;
use std::time::Duration;

/// Starts the subscriber liveness sweep.
///
/// Every `interval` each subscriber that answered the previous probe is sent
/// a new one, and each subscriber that did not is evicted. An interval of
/// zero disables the task.
pub async fn start_liveness_task(state: Arc<AppState>, interval: Duration) {
    LivenessMonitor::new(state.hub.registry().clone(), interval)
        .run()
        .await;
}
