//! Error types for graph construction and repository scanning.

/// Errors that can occur while building a [`crate::Graph`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge references a node that is not part of the node set.
    #[error("edge {from} -> {to} references unknown node {missing}")]
    UnknownNode {
        /// Source of the offending edge.
        from: String,
        /// Target of the offending edge.
        to: String,
        /// The endpoint missing from the node set.
        missing: String,
    },
}

/// Errors that can occur while scanning a repository for dependencies.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The module file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The module file is not well formed.
    #[error("failed to parse {path} line {line}: {reason}")]
    Parse {
        path: String,
        line: usize,
        reason: String,
    },
}
