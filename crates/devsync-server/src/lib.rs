//! DevSync server library logic.

pub mod api_events;
pub mod api_graph;
pub mod api_ws;
pub mod background;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use devsync_graph::GraphCatalog;
use devsync_hub::{Hub, Welcome};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Current dependency graph and its blast-radius maps.
    pub graph: Arc<GraphCatalog>,
    /// Live event hub holding every WebSocket subscriber.
    pub hub: Hub,
    /// Frames buffered per subscriber before it is evicted as too slow.
    pub outbound_buffer: usize,
}

impl AppState {
    /// Builds fresh state from the hub section of the configuration.
    pub fn new(hub: &config::HubConfig) -> Self {
        Self {
            graph: Arc::new(GraphCatalog::new()),
            hub: Hub::with_welcome(Welcome {
                message: hub.welcome_message.clone(),
            }),
            outbound_buffer: hub.outbound_buffer,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&config::HubConfig::default())
    }
}

/// Maximum request body size (64 KiB). Scan results and events are small.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/graph",
            get(api_graph::get_graph_handler).put(api_graph::put_graph_handler),
        )
        .route("/graph/adjacency", get(api_graph::get_adjacency_handler))
        .route(
            "/graph/blast-radius",
            get(api_graph::get_blast_radius_handler),
        )
        .route(
            "/graph/blast-radius/{*node}",
            get(api_graph::get_node_blast_radius_handler),
        )
        .route("/graph/summary", get(api_graph::get_summary_handler))
        .route("/scan", post(api_graph::scan_handler))
        .route("/events", post(api_events::emit_handler))
        .route("/emit-deploy", post(api_events::emit_deploy_handler))
        .route("/ws", get(api_ws::ws_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
