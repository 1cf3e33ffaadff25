//! Graph API handlers: scan ingestion, graph queries and blast radius.

use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use devsync_graph::{
    reachable, scan_go_module, BlastRadiusMap, Direction, Edge, GraphError, GraphSnapshot,
    NodeId, ScanError, ScanResult,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for GraphApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            GraphApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            GraphApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            GraphApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<GraphError> for GraphApiError {
    fn from(e: GraphError) -> Self {
        GraphApiError::BadRequest(e.to_string())
    }
}

impl From<ScanError> for GraphApiError {
    fn from(e: ScanError) -> Self {
        GraphApiError::BadRequest(format!("failed to scan: {e}"))
    }
}

impl From<JsonRejection> for GraphApiError {
    fn from(rejection: JsonRejection) -> Self {
        GraphApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for GraphApiError {
    fn from(rejection: QueryRejection) -> Self {
        GraphApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DirectionParams {
    #[serde(default)]
    pub direction: Direction,
}

/// Body of `GET /graph`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphView {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<Edge>,
    pub built_at: String,
}

/// Body of `GET /graph/summary` and of a successful rebuild.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub max_blast_radius: usize,
    pub max_dependents_radius: usize,
    pub built_at: String,
}

impl From<&GraphSnapshot> for GraphSummary {
    fn from(snapshot: &GraphSnapshot) -> Self {
        Self {
            nodes: snapshot.graph.node_count(),
            edges: snapshot.graph.edge_count(),
            max_blast_radius: snapshot.dependencies.max(),
            max_dependents_radius: snapshot.dependents.max(),
            built_at: snapshot.built_at.clone(),
        }
    }
}

/// Body of `GET /graph/blast-radius/{node}`.
#[derive(Debug, Serialize)]
pub struct NodeBlastRadius {
    pub node: NodeId,
    pub direction: Direction,
    pub radius: usize,
    pub reachable: Vec<NodeId>,
}

/// Body of `POST /scan`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub repo_path: String,
}

/// Builds and publishes a new snapshot on a blocking thread.
async fn rebuild(state: Arc<AppState>, scan: ScanResult) -> Result<GraphSummary, GraphApiError> {
    let snapshot = tokio::task::spawn_blocking(move || state.graph.rebuild(scan))
        .await
        .map_err(|e| GraphApiError::InternalServerError(format!("task join error: {}", e)))?
        .map_err(|e| {
            tracing::warn!("rejected graph rebuild: {}", e);
            GraphApiError::from(e)
        })?;

    Ok(GraphSummary::from(snapshot.as_ref()))
}

/// Handler for `GET /graph`.
pub async fn get_graph_handler(Extension(state): Extension<Arc<AppState>>) -> Json<GraphView> {
    let snapshot = state.graph.current();
    Json(GraphView {
        nodes: snapshot.graph.nodes().to_vec(),
        edges: snapshot.graph.edges().to_vec(),
        built_at: snapshot.built_at.clone(),
    })
}

/// Handler for `PUT /graph`.
///
/// Replaces the graph with the posted scan result. A scan that references
/// unknown nodes is rejected and the current graph stays in place.
pub async fn put_graph_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ScanResult>, JsonRejection>,
) -> Result<Json<GraphSummary>, GraphApiError> {
    let Json(scan) = payload?;
    Ok(Json(rebuild(state, scan).await?))
}

/// Handler for `GET /graph/adjacency`.
pub async fn get_adjacency_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<BTreeMap<NodeId, Vec<NodeId>>> {
    Json(state.graph.current().graph.adjacency_map())
}

/// Handler for `GET /graph/blast-radius`.
pub async fn get_blast_radius_handler(
    Extension(state): Extension<Arc<AppState>>,
    params: Result<Query<DirectionParams>, QueryRejection>,
) -> Result<Json<BlastRadiusMap>, GraphApiError> {
    let Query(params) = params?;
    let snapshot = state.graph.current();
    Ok(Json(snapshot.blast_radius(params.direction).clone()))
}

/// Handler for `GET /graph/blast-radius/{node}`.
pub async fn get_node_blast_radius_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(node): Path<String>,
    params: Result<Query<DirectionParams>, QueryRejection>,
) -> Result<Json<NodeBlastRadius>, GraphApiError> {
    let Query(params) = params?;
    let snapshot = state.graph.current();
    if !snapshot.graph.contains(&node) {
        return Err(GraphApiError::NotFound(format!("unknown node {node}")));
    }

    let reachable: Vec<NodeId> = reachable(&snapshot.graph, &node, params.direction)
        .into_iter()
        .collect();
    Ok(Json(NodeBlastRadius {
        radius: reachable.len(),
        node,
        direction: params.direction,
        reachable,
    }))
}

/// Handler for `GET /graph/summary`.
pub async fn get_summary_handler(Extension(state): Extension<Arc<AppState>>) -> Json<GraphSummary> {
    Json(GraphSummary::from(state.graph.current().as_ref()))
}

/// Handler for `POST /scan`.
///
/// Scans the Go module at `repoPath` and publishes the resulting graph.
pub async fn scan_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<GraphSummary>, GraphApiError> {
    let Json(request) = payload?;
    let repo_path = request.repo_path;

    let scan = tokio::task::spawn_blocking({
        let repo_path = repo_path.clone();
        move || scan_go_module(repo_path)
    })
    .await
    .map_err(|e| GraphApiError::InternalServerError(format!("task join error: {}", e)))?
    .map_err(|e| {
        tracing::warn!(repo_path = %repo_path, "scan error: {}", e);
        GraphApiError::from(e)
    })?;

    let summary = rebuild(state, scan).await?;
    tracing::info!(
        repo_path = %repo_path,
        nodes = summary.nodes,
        "scan complete"
    );
    Ok(Json(summary))
}
