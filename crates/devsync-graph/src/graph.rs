//! Immutable dependency graph built from a scan result.

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Identifier of a repository node, unique within one graph.
pub type NodeId = String;

/// A directed dependency edge: `from` depends on `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

impl Edge {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Raw output of a repository scan, as received on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(default)]
    pub nodes: Vec<NodeId>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// A validated, read-only dependency graph.
///
/// Node order and adjacency order follow the order in which they first
/// appeared in the scan. Duplicate node identifiers are collapsed; duplicate
/// edges are retained in [`Graph::edges`] and in the adjacency lists.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<NodeId>,
    members: HashSet<NodeId>,
    edges: Vec<Edge>,
    forward: HashMap<NodeId, Vec<NodeId>>,
    reverse: HashMap<NodeId, Vec<NodeId>>,
}

impl Graph {
    /// Builds a graph, rejecting any edge whose endpoints are not in `nodes`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownNode`] for the first offending edge.
    pub fn build<N, E>(nodes: N, edges: E) -> Result<Self, GraphError>
    where
        N: IntoIterator,
        N::Item: Into<NodeId>,
        E: IntoIterator<Item = Edge>,
    {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for node in nodes {
            let node = node.into();
            if seen.insert(node.clone()) {
                ordered.push(node);
            }
        }

        let mut graph = Graph {
            nodes: ordered,
            members: seen,
            ..Graph::default()
        };

        for edge in edges {
            for endpoint in [&edge.from, &edge.to] {
                if !graph.members.contains(endpoint) {
                    return Err(GraphError::UnknownNode {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
            graph
                .forward
                .entry(edge.from.clone())
                .or_default()
                .push(edge.to.clone());
            graph
                .reverse
                .entry(edge.to.clone())
                .or_default()
                .push(edge.from.clone());
            graph.edges.push(edge);
        }

        Ok(graph)
    }

    /// Builds a graph from a wire-level scan result.
    pub fn from_scan(scan: ScanResult) -> Result<Self, GraphError> {
        Self::build(scan.nodes, scan.edges)
    }

    /// Nodes in first-seen order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.members.contains(node)
    }

    /// Outgoing neighbours of `node`. Unknown nodes have none.
    pub fn adjacency(&self, node: &str) -> &[NodeId] {
        self.forward.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Incoming neighbours of `node`, i.e. the repos that depend on it.
    pub fn dependents(&self, node: &str) -> &[NodeId] {
        self.reverse.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Node-to-dependencies mapping, including nodes with no edges.
    pub fn adjacency_map(&self) -> BTreeMap<NodeId, Vec<NodeId>> {
        self.nodes
            .iter()
            .map(|node| (node.clone(), self.adjacency(node).to_vec()))
            .collect()
    }

    /// Converts the graph back into its wire form.
    pub fn to_scan(&self) -> ScanResult {
        ScanResult {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }
}
