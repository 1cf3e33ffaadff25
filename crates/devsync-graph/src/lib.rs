//! Dependency graph and blast-radius engine for DevSync.
//!
//! A scan of the tracked repositories produces a node list and a list of
//! directed edges (`from` depends on `to`). This crate turns that scan into an
//! immutable [`Graph`], computes the [`BlastRadiusMap`] for every node, and
//! publishes the pair through a [`GraphCatalog`] so readers always see a
//! complete snapshot while a rebuild runs.
//!
//! # Blast radius
//!
//! The blast radius of a node is the number of distinct nodes reachable from
//! it, never counting the node itself. Two directions are supported:
//!
//! | Direction | Walks | Answers |
//! |-----------|-------|---------|
//! | [`Direction::Dependencies`] | `from -> to` | "what does this repo pull in" |
//! | [`Direction::Dependents`] | `to -> from` | "what breaks if this repo changes" |
//!
//! `Dependencies` is the default and is what the graph view renders.
//!
//! # Usage
//!
//! ```rust,ignore
//! use devsync_graph::{GraphCatalog, ScanResult};
//!
//! let catalog = GraphCatalog::new();
//! let snapshot = catalog.rebuild(scan)?;
//! assert_eq!(snapshot.dependencies.get("svc-a"), Some(2));
//! ```

mod blast;
mod catalog;
mod error;
mod graph;
pub mod scanner;

pub use blast::{compute, compute_in, reachable, BlastRadiusMap, Direction};
pub use catalog::{GraphCatalog, GraphSnapshot};
pub use error::{GraphError, ScanError};
pub use graph::{Edge, Graph, NodeId, ScanResult};
pub use scanner::scan_go_module;
