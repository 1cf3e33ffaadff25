//! WebSocket subscriber endpoint.
//!
//! Each socket gets a bounded outbound queue. The hub holds the sending half;
//! a writer task drains the queue into the socket and a reader task watches
//! for pongs and close frames. When the hub evicts the subscriber the queue
//! closes, the writer sends a close frame and the socket is torn down.

use crate::AppState;
use axum::{
    body::Bytes,
    extract::{
        ws::{Message as AxumMessage, WebSocket},
        ConnectInfo, Extension, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use devsync_hub::{ConnectionId, Hub, Outbound};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::mpsc;

/// Upper bound on a single socket write. A peer that stalls longer is
/// treated as dead rather than waited on.
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// WebSocket handler: `GET /ws`.
pub async fn ws_handler(
    Extension(state): Extension<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    tracing::debug!(remote_addr = %addr, "websocket upgrade requested");
    ws.on_upgrade(move |socket| handle_socket(socket, state, addr))
}

fn to_ws_message(frame: Outbound) -> AxumMessage {
    match frame {
        Outbound::Text(json) => AxumMessage::Text(json.into()),
        Outbound::Ping => AxumMessage::Ping(Bytes::new()),
    }
}

/// Drains the subscriber's queue into the socket.
async fn write_loop(
    mut sender: SplitSink<WebSocket, AxumMessage>,
    mut rx: mpsc::Receiver<Outbound>,
    connection_id: ConnectionId,
) {
    while let Some(frame) = rx.recv().await {
        match tokio::time::timeout(WRITE_TIMEOUT, sender.send(to_ws_message(frame))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(connection_id = %connection_id, "websocket write failed: {}", e);
                return;
            }
            Err(_) => {
                tracing::warn!(connection_id = %connection_id, "websocket write timed out");
                return;
            }
        }
    }

    // The hub dropped this subscriber.
    let _ = sender.send(AxumMessage::Close(None)).await;
}

/// Watches inbound frames; pongs answer liveness probes.
async fn read_loop(mut receiver: SplitStream<WebSocket>, hub: Hub, connection_id: ConnectionId) {
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            AxumMessage::Pong(_) => {
                hub.acknowledge(connection_id).await;
            }
            AxumMessage::Close(_) => break,
            AxumMessage::Text(_) | AxumMessage::Binary(_) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    "ignoring inbound data frame on event stream"
                );
            }
            AxumMessage::Ping(_) => {}
        }
    }
}

/// Handles one subscriber socket from upgrade to teardown.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, addr: SocketAddr) {
    let (sender, receiver) = socket.split();

    // Bounded so a slow consumer is evicted instead of growing memory.
    let (tx, rx) = mpsc::channel::<Outbound>(state.outbound_buffer);

    let connection_id = match state.hub.subscribe(Arc::new(tx)).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(remote_addr = %addr, "failed to register subscriber: {}", e);
            return;
        }
    };
    tracing::info!(
        connection_id = %connection_id,
        remote_addr = %addr,
        "websocket subscriber connected"
    );

    let mut send_task = tokio::spawn(write_loop(sender, rx, connection_id));
    let mut recv_task = tokio::spawn(read_loop(receiver, state.hub.clone(), connection_id));

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.unsubscribe(connection_id).await;
    tracing::info!(
        connection_id = %connection_id,
        remote_addr = %addr,
        "websocket subscriber closed"
    );
}
