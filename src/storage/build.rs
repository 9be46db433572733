//! Graph construction from blob-labelling output and edge lists

use super::graph::{Graph, Node, NodeId};
use crate::error::{GraphError, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Edge-blob label reserved for background pixels
pub const BACKGROUND_LABEL: u32 = 0;

impl Graph {
    /// Build a graph from node-blob centroids and node-to-edge-blob contacts
    ///
    /// One node is created per centroid label. An edge blob touched by
    /// exactly two distinct node blobs connects those two nodes; edge blobs
    /// touched by any other number of nodes are ignored, as is the
    /// background label `0`.
    ///
    /// # Arguments
    ///
    /// * `centroids` - node-blob label → `(i, j)` centroid
    /// * `node_edges` - node-blob label → labels of edge blobs it touches
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if `node_edges` names a node label with no centroid
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::{BTreeMap, BTreeSet};
    /// use skelgraph::{Graph, NodeId};
    ///
    /// let centroids = BTreeMap::from([(1, (0.0, 0.0)), (2, (0.0, 10.0)), (3, (10.0, 0.0))]);
    /// let node_edges = BTreeMap::from([
    ///     (1, BTreeSet::from([7, 8])),
    ///     (2, BTreeSet::from([7])),
    ///     (3, BTreeSet::from([8, 9])),
    /// ]);
    ///
    /// let graph = Graph::from_blobs(&centroids, &node_edges).unwrap();
    /// assert_eq!(graph.len(), 3);
    /// assert_eq!(graph.num_edges(), 2); // blob 9 touches only node 3
    /// assert!(graph.get(NodeId(1)).unwrap().is_connected_to(NodeId(3)));
    /// ```
    pub fn from_blobs(
        centroids: &BTreeMap<u32, (f64, f64)>,
        node_edges: &BTreeMap<u32, BTreeSet<u32>>,
    ) -> Result<Self> {
        let mut graph = Self::from_nodes(
            centroids
                .iter()
                .map(|(label, &(i, j))| (NodeId(*label), Node::isolated(i, j))),
        );

        // Edge-blob label → node labels touching it
        let mut touching: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
        for (node_label, edge_labels) in node_edges {
            if !centroids.contains_key(node_label) {
                return Err(GraphError::KeyNotFound(NodeId(*node_label)));
            }
            for &edge_label in edge_labels {
                if edge_label == BACKGROUND_LABEL {
                    continue;
                }
                touching.entry(edge_label).or_default().insert(*node_label);
            }
        }

        let mut ignored = 0_usize;
        for nodes in touching.values() {
            let mut pair = nodes.iter();
            match (pair.next(), pair.next(), pair.next()) {
                (Some(&a), Some(&b), None) => graph.connect(NodeId(a), NodeId(b))?,
                _ => ignored += 1,
            }
        }

        debug!(
            nodes = graph.len(),
            edges = graph.num_edges(),
            ignored_edge_blobs = ignored,
            "built graph from blobs"
        );

        Ok(graph)
    }

    /// Build a graph from positioned nodes and an undirected edge list
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if a node key repeats, `KeyNotFound` if an edge
    /// names an unknown node, or `SelfLoop` for an edge `(a, a)`
    pub fn from_edge_list(nodes: &[(NodeId, f64, f64)], edges: &[(NodeId, NodeId)]) -> Result<Self> {
        let mut graph = Self::new();
        for &(key, i, j) in nodes {
            graph.insert(key, Node::isolated(i, j))?;
        }
        for &(a, b) in edges {
            graph.connect(a, b)?;
        }
        Ok(graph)
    }
}
