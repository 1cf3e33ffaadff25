//! Liveness sweep behaviour, driven on a paused clock.

use devsync_hub::{kinds, Event, Hub, LivenessMonitor, Outbound};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const INTERVAL: Duration = Duration::from_secs(30);

async fn advance(by: Duration) {
    tokio::time::sleep(by).await;
    tokio::task::yield_now().await;
}

#[tokio::test]
async fn sweep_probes_then_evicts_silent_connection() {
    let hub = Hub::new();
    let (tx, mut rx) = mpsc::channel::<Outbound>(8);
    let id = hub.subscribe(Arc::new(tx)).await.unwrap();
    rx.recv().await.unwrap();

    let monitor = LivenessMonitor::new(hub.registry().clone(), INTERVAL);

    let first = monitor.sweep().await;
    assert_eq!(first.probed, 1);
    assert!(first.evicted.is_empty());
    assert_eq!(rx.recv().await, Some(Outbound::Ping));

    let second = monitor.sweep().await;
    assert_eq!(second.evicted, vec![id]);
    assert!(!hub.registry().contains(id).await);

    let report = hub
        .emit(&Event::now(kinds::REPO_UPDATE, "svc", "deployed"))
        .await
        .unwrap();
    assert_eq!(report.attempted, 0);
}

#[tokio::test]
async fn acknowledged_probe_keeps_connection() {
    let hub = Hub::new();
    let (tx, mut rx) = mpsc::channel::<Outbound>(8);
    let id = hub.subscribe(Arc::new(tx)).await.unwrap();
    rx.recv().await.unwrap();

    let monitor = LivenessMonitor::new(hub.registry().clone(), INTERVAL);
    for _ in 0..5 {
        let report = monitor.sweep().await;
        assert!(report.evicted.is_empty());
        assert_eq!(rx.recv().await, Some(Outbound::Ping));
        assert!(hub.acknowledge(id).await);
    }
    assert!(hub.registry().contains(id).await);
}

#[tokio::test]
async fn unsendable_probe_evicts_immediately() {
    let hub = Hub::new();
    let (tx, rx) = mpsc::channel::<Outbound>(8);
    let id = hub.subscribe(Arc::new(tx)).await.unwrap();
    drop(rx);

    let monitor = LivenessMonitor::new(hub.registry().clone(), INTERVAL);
    let report = monitor.sweep().await;
    assert_eq!(report.probed, 0);
    assert_eq!(report.evicted, vec![id]);
}

#[tokio::test(start_paused = true)]
async fn silent_connection_is_gone_within_one_interval_of_missed_probe() {
    let hub = Hub::new();
    let (silent_tx, mut silent_rx) = mpsc::channel::<Outbound>(8);
    let silent = hub.subscribe(Arc::new(silent_tx)).await.unwrap();
    let (chatty_tx, mut chatty_rx) = mpsc::channel::<Outbound>(8);
    let chatty = hub.subscribe(Arc::new(chatty_tx)).await.unwrap();
    silent_rx.recv().await.unwrap();
    chatty_rx.recv().await.unwrap();

    let monitor = LivenessMonitor::new(hub.registry().clone(), INTERVAL);
    let task = tokio::spawn(monitor.run());

    // First probe goes out one interval after start.
    advance(INTERVAL + Duration::from_secs(1)).await;
    assert_eq!(silent_rx.try_recv(), Ok(Outbound::Ping));
    assert_eq!(chatty_rx.try_recv(), Ok(Outbound::Ping));
    assert!(hub.acknowledge(chatty).await);
    assert!(hub.registry().contains(silent).await);

    // The next sweep finds the silent probe unanswered.
    advance(INTERVAL).await;
    assert!(!hub.registry().contains(silent).await);
    assert!(hub.registry().contains(chatty).await);

    task.abort();
}

#[tokio::test]
async fn zero_interval_disables_the_sweep() {
    let hub = Hub::new();
    let monitor = LivenessMonitor::new(hub.registry().clone(), Duration::ZERO);
    // Returns instead of looping forever.
    monitor.run().await;
}
