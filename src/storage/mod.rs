//! Graph storage layer
//!
//! Provides the keyed adjacency graph, its mutation primitives, and
//! construction from blob-labelling output.

pub mod build;
pub mod graph;

pub use build::BACKGROUND_LABEL;
pub use graph::{Graph, Node, NodeId};
