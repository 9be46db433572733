//! skelgraph: topological graph refinement for skeletonized images
//!
//! # Overview
//!
//! Upstream image processing (skeletonization, blob labelling, centroids)
//! yields a raw graph: one node per high-connectivity pixel blob, connected
//! through edge blobs. skelgraph cleans it up into a structural graph by
//! merging nearby nodes, pruning dangling branches, keeping only nodes on
//! closed loops of a given length, and keeping the largest component.
//!
//! # Quick Start
//!
//! ```
//! use skelgraph::{diagnose_graph, mean_position, merge_all, prune_recursive, within_distance};
//! use skelgraph::{Graph, NodeId};
//!
//! let mut graph = Graph::from_edge_list(
//!     &[(NodeId(1), 0.0, 0.0), (NodeId(2), 0.0, 3.0), (NodeId(3), 0.0, 80.0)],
//!     &[(NodeId(1), NodeId(2)), (NodeId(2), NodeId(3))],
//! ).unwrap();
//!
//! // Merge nodes closer than 30 px
//! merge_all(&mut graph, within_distance(30.0), mean_position).unwrap();
//! assert_eq!(graph.len(), 2);
//!
//! // Strip nodes with fewer than two connections, to a fixpoint
//! prune_recursive(&mut graph, |node| node.degree() < 2).unwrap();
//! assert!(graph.is_empty());
//!
//! assert!(diagnose_graph(&graph).is_ok());
//! ```
//!
//! # Architecture
//!
//! - **Storage**: keyed adjacency map; nodes reference neighbours by key only
//! - **Algorithms**: prune, merge, bounded loop search, components, diagnostics
//! - **Pipeline**: configurable stage sequence with per-stage reports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod error;
pub mod pipeline;
pub mod storage;

// Re-export core types
pub use algorithms::{
    bfs, breadth_first_search, connected_components, degree_below, dfs, diagnose_graph,
    largest_component, mean_position, merge_all, merge_neighbours, on_cycle_of_length, prune,
    prune_recursive, retain_cycle_members, within_distance, Diagnosis, IntegrityViolation,
};
pub use error::{GraphError, Result};
pub use pipeline::{Pipeline, PipelineConfig, PipelineReport, Stage, StageReport};
pub use storage::{Graph, Node, NodeId};
