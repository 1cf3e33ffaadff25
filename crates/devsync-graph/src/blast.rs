//! Transitive reachability ("blast radius") over a [`Graph`].

use crate::graph::{Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which way to walk the dependency edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow `from -> to`: everything a node transitively depends on.
    #[default]
    Dependencies,
    /// Follow `to -> from`: everything that transitively depends on a node.
    Dependents,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies",
            Self::Dependents => "dependents",
        }
    }

    fn neighbours<'g>(self, graph: &'g Graph, node: &str) -> &'g [NodeId] {
        match self {
            Self::Dependencies => graph.adjacency(node),
            Self::Dependents => graph.dependents(node),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blast radius of every node in a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlastRadiusMap(BTreeMap<NodeId, usize>);

impl BlastRadiusMap {
    pub fn get(&self, node: &str) -> Option<usize> {
        self.0.get(node).copied()
    }

    /// Largest radius in the map, `0` for an empty graph.
    pub fn max(&self) -> usize {
        self.0.values().copied().max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, usize)> {
        self.0.iter().map(|(node, radius)| (node, *radius))
    }
}

/// Every node reachable from `start`, excluding `start` itself.
///
/// Uses an explicit work stack so pathological depths cannot overflow the
/// call stack. Cycles terminate because a node is pushed at most once.
pub fn reachable(graph: &Graph, start: &str, direction: Direction) -> BTreeSet<NodeId> {
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut stack: Vec<&str> = vec![start];

    while let Some(node) = stack.pop() {
        for next in direction.neighbours(graph, node) {
            if next.as_str() != start && visited.insert(next.as_str()) {
                stack.push(next.as_str());
            }
        }
    }

    visited.into_iter().map(str::to_owned).collect()
}

/// Blast radius of every node, following dependency edges.
pub fn compute(graph: &Graph) -> BlastRadiusMap {
    compute_in(graph, Direction::Dependencies)
}

/// Blast radius of every node in the given direction.
pub fn compute_in(graph: &Graph, direction: Direction) -> BlastRadiusMap {
    let map = graph
        .nodes()
        .iter()
        .map(|node| (node.clone(), reachable(graph, node, direction).len()))
        .collect();
    BlastRadiusMap(map)
}
