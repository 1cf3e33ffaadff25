//! Atomically swapped graph snapshots.

use crate::blast::{compute_in, BlastRadiusMap, Direction};
use crate::error::GraphError;
use crate::graph::{Graph, ScanResult};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// A graph together with the blast-radius maps derived from it.
///
/// Snapshots are never mutated after construction, so any reader holding one
/// sees nodes, edges and radii from the same scan.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    pub graph: Graph,
    pub dependencies: BlastRadiusMap,
    pub dependents: BlastRadiusMap,
    /// RFC 3339 timestamp of when the snapshot was computed.
    pub built_at: String,
}

impl GraphSnapshot {
    /// Computes both blast-radius maps for `graph`.
    pub fn compute(graph: Graph) -> Self {
        let dependencies = compute_in(&graph, Direction::Dependencies);
        let dependents = compute_in(&graph, Direction::Dependents);
        Self {
            graph,
            dependencies,
            dependents,
            built_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }

    pub fn empty() -> Self {
        Self::compute(Graph::default())
    }

    pub fn blast_radius(&self, direction: Direction) -> &BlastRadiusMap {
        match direction {
            Direction::Dependencies => &self.dependencies,
            Direction::Dependents => &self.dependents,
        }
    }
}

/// Holds the current [`GraphSnapshot`] and replaces it in one step.
///
/// Reads are lock-free loads. A rebuild computes the new snapshot off to the
/// side and only publishes it once it is complete; a failed rebuild leaves the
/// previous snapshot in place.
#[derive(Debug)]
pub struct GraphCatalog {
    current: ArcSwap<GraphSnapshot>,
}

impl Default for GraphCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphCatalog {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(GraphSnapshot::empty()),
        }
    }

    /// Returns the snapshot that is current at the time of the call.
    pub fn current(&self) -> Arc<GraphSnapshot> {
        self.current.load_full()
    }

    /// Builds a graph from `scan`, computes its radii and publishes it.
    ///
    /// This is CPU-bound; async callers should run it on a blocking thread.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if the scan references unknown nodes. The
    /// previously published snapshot remains current in that case.
    pub fn rebuild(&self, scan: ScanResult) -> Result<Arc<GraphSnapshot>, GraphError> {
        let graph = Graph::from_scan(scan)?;
        let snapshot = Arc::new(GraphSnapshot::compute(graph));
        self.current.store(Arc::clone(&snapshot));

        tracing::info!(
            nodes = snapshot.graph.node_count(),
            edges = snapshot.graph.edge_count(),
            max_blast_radius = snapshot.dependencies.max(),
            "published new graph snapshot"
        );

        Ok(snapshot)
    }
}
