//! Keyed adjacency graph
//!
//! The graph owns every node in a map keyed by [`NodeId`]. Nodes refer to one
//! another only by key, so the adjacency relation can be cyclic without any
//! cyclic ownership.
//!
//! ```text
//! Graph: 1 - 2, 2 - 3, 3 - 1
//!
//! nodes:
//!   1 -> Node { i, j, connects: [2, 3] }
//!   2 -> Node { i, j, connects: [1, 3] }
//!   3 -> Node { i, j, connects: [2, 1] }
//! ```
//!
//! Every mutator keeps two invariants:
//! - Symmetry: if `a` lists `b`, then `b` lists `a`
//! - Closure: every listed key is present in the graph

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Node key (stable across merge and prune)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Graph node: a planar centroid plus its adjacency list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Row coordinate of the centroid
    pub i: f64,
    /// Column coordinate of the centroid
    pub j: f64,
    connects: Vec<NodeId>,
}

impl Node {
    /// Create a node at `(i, j)`
    ///
    /// Duplicate neighbours are dropped, keeping the first occurrence.
    #[must_use]
    pub fn new(i: f64, j: f64, connects: Vec<NodeId>) -> Self {
        let mut seen = BTreeSet::new();
        let connects = connects.into_iter().filter(|k| seen.insert(*k)).collect();
        Self { i, j, connects }
    }

    /// Create a node with no neighbours
    #[must_use]
    pub const fn isolated(i: f64, j: f64) -> Self {
        Self {
            i,
            j,
            connects: Vec::new(),
        }
    }

    /// Neighbour keys in insertion order
    #[must_use]
    pub fn connects(&self) -> &[NodeId] {
        &self.connects
    }

    /// Number of neighbours
    #[must_use]
    pub fn degree(&self) -> usize {
        self.connects.len()
    }

    /// Whether `key` is listed as a neighbour
    #[must_use]
    pub fn is_connected_to(&self, key: NodeId) -> bool {
        self.connects.contains(&key)
    }

    /// Centroid as `(i, j)`
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        (self.i, self.j)
    }

    fn link(&mut self, key: NodeId) {
        if !self.connects.contains(&key) {
            self.connects.push(key);
        }
    }

    fn unlink(&mut self, key: NodeId) {
        self.connects.retain(|k| *k != key);
    }
}

/// Undirected graph of planar nodes
///
/// # Example
///
/// ```
/// use skelgraph::{Graph, Node, NodeId};
///
/// let mut graph = Graph::new();
/// graph.insert(NodeId(1), Node::isolated(0.0, 0.0)).unwrap();
/// graph.insert(NodeId(2), Node::new(0.0, 5.0, vec![NodeId(1)])).unwrap();
///
/// // Insert restores the back reference
/// assert!(graph.get(NodeId(1)).unwrap().is_connected_to(NodeId(2)));
/// assert_eq!(graph.num_edges(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
}

impl Graph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Build a graph from raw producer data without validation
    ///
    /// Later entries overwrite earlier ones with the same key. Run
    /// [`diagnose_graph`](crate::diagnose_graph) to check the result.
    pub fn from_nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, Node)>,
    {
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }

    /// Look up a node
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if `key` is absent
    pub fn get(&self, key: NodeId) -> Result<&Node> {
        self.nodes.get(&key).ok_or(GraphError::KeyNotFound(key))
    }

    /// Whether `key` is present
    #[must_use]
    pub fn contains(&self, key: NodeId) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of undirected edges
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.nodes.values().map(Node::degree).sum::<usize>() / 2
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Iterate `(key, node)` pairs in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().map(|(k, n)| (*k, n))
    }

    /// Remove a batch of nodes
    ///
    /// Each removed key is stripped from the adjacency of its surviving
    /// neighbours. Connections between two removed nodes are not touched.
    /// Duplicate keys in `keys` are allowed.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` for the first absent key; the graph is unchanged
    pub fn remove(&mut self, keys: &[NodeId]) -> Result<()> {
        if let Some(missing) = keys.iter().find(|k| !self.nodes.contains_key(k)) {
            return Err(GraphError::KeyNotFound(*missing));
        }

        let doomed: BTreeSet<NodeId> = keys.iter().copied().collect();
        for key in &doomed {
            let Some(node) = self.nodes.remove(key) else {
                continue;
            };

            for neighbour in node.connects {
                if doomed.contains(&neighbour) {
                    continue;
                }
                // Dangling references from corrupt input are skipped
                if let Some(other) = self.nodes.get_mut(&neighbour) {
                    other.unlink(*key);
                }
            }
        }

        Ok(())
    }

    /// Insert `node` under `key` and add `key` to each listed neighbour
    ///
    /// A self reference in `node`'s adjacency is dropped.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if `key` exists, or `KeyNotFound` if a listed
    /// neighbour is absent; the graph is unchanged in both cases
    pub fn insert(&mut self, key: NodeId, mut node: Node) -> Result<()> {
        if self.nodes.contains_key(&key) {
            return Err(GraphError::DuplicateKey(key));
        }

        node.unlink(key);
        if let Some(missing) = node.connects.iter().find(|k| !self.nodes.contains_key(k)) {
            return Err(GraphError::KeyNotFound(*missing));
        }

        for neighbour in &node.connects {
            if let Some(other) = self.nodes.get_mut(neighbour) {
                other.link(key);
            }
        }
        self.nodes.insert(key, node);

        Ok(())
    }

    /// Connect two nodes in both directions (no-op if already connected)
    ///
    /// # Errors
    ///
    /// Returns `SelfLoop` if `a == b`, or `KeyNotFound` if either is absent
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        self.require(a)?;
        self.require(b)?;

        if let Some(node) = self.nodes.get_mut(&a) {
            node.link(b);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.link(a);
        }
        Ok(())
    }

    /// Remove the connection between two nodes (no-op if not connected)
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if either node is absent
    pub fn disconnect(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        self.require(a)?;
        self.require(b)?;

        if let Some(node) = self.nodes.get_mut(&a) {
            node.unlink(b);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.unlink(a);
        }
        Ok(())
    }

    /// Rewrite every node position through `f(i, j)`
    ///
    /// Adjacency is untouched.
    pub fn map_positions<F>(&mut self, mut f: F)
    where
        F: FnMut(f64, f64) -> (f64, f64),
    {
        for node in self.nodes.values_mut() {
            let (i, j) = f(node.i, node.j);
            node.i = i;
            node.j = j;
        }
    }

    /// Keep only the nodes in `keep`, removing the rest as one batch
    pub(crate) fn retain_keys(&mut self, keep: &BTreeSet<NodeId>) -> Result<usize> {
        let doomed: Vec<NodeId> = self.keys().filter(|k| !keep.contains(k)).collect();
        self.remove(&doomed)?;
        Ok(doomed.len())
    }

    fn require(&self, key: NodeId) -> Result<()> {
        if self.nodes.contains_key(&key) {
            Ok(())
        } else {
            Err(GraphError::KeyNotFound(key))
        }
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = (&'a NodeId, &'a Node);
    type IntoIter = std::collections::btree_map::Iter<'a, NodeId, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    /// Path graph 1 - 2 - 3 - 4
    fn path_graph() -> Graph {
        let mut graph = Graph::new();
        graph.insert(NodeId(1), Node::isolated(0.0, 0.0)).unwrap();
        graph.insert(NodeId(2), Node::new(0.0, 1.0, ids(&[1]))).unwrap();
        graph.insert(NodeId(3), Node::new(0.0, 2.0, ids(&[2]))).unwrap();
        graph.insert(NodeId(4), Node::new(0.0, 3.0, ids(&[3]))).unwrap();
        graph
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::new();
        assert_eq!(graph.len(), 0);
        assert_eq!(graph.num_edges(), 0);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_node_new_drops_duplicates() {
        let node = Node::new(1.0, 2.0, ids(&[3, 1, 3, 2, 1]));
        assert_eq!(node.connects(), &ids(&[3, 1, 2])[..]);
        assert_eq!(node.degree(), 3);
        assert_eq!(node.position(), (1.0, 2.0));
    }

    #[test]
    fn test_get_missing_key() {
        let graph = path_graph();
        assert_eq!(
            graph.get(NodeId(99)).unwrap_err(),
            GraphError::KeyNotFound(NodeId(99))
        );
    }

    #[test]
    fn test_insert_restores_symmetry() {
        let graph = path_graph();
        assert_eq!(graph.get(NodeId(2)).unwrap().connects(), &ids(&[1, 3])[..]);
        assert_eq!(graph.get(NodeId(3)).unwrap().connects(), &ids(&[2, 4])[..]);
        assert_eq!(graph.num_edges(), 3);
    }

    #[test]
    fn test_insert_duplicate_key() {
        let mut graph = path_graph();
        let err = graph.insert(NodeId(2), Node::isolated(9.0, 9.0)).unwrap_err();
        assert_eq!(err, GraphError::DuplicateKey(NodeId(2)));
        assert_eq!(graph.get(NodeId(2)).unwrap().i, 0.0);
    }

    #[test]
    fn test_insert_unknown_neighbour_is_atomic() {
        let mut graph = path_graph();
        let err = graph
            .insert(NodeId(5), Node::new(1.0, 1.0, ids(&[1, 42])))
            .unwrap_err();
        assert_eq!(err, GraphError::KeyNotFound(NodeId(42)));
        assert!(!graph.contains(NodeId(5)));
        assert!(!graph.get(NodeId(1)).unwrap().is_connected_to(NodeId(5)));
    }

    #[test]
    fn test_insert_drops_self_reference() {
        let mut graph = path_graph();
        graph
            .insert(NodeId(5), Node::new(1.0, 1.0, ids(&[5, 4])))
            .unwrap();
        assert_eq!(graph.get(NodeId(5)).unwrap().connects(), &ids(&[4])[..]);
    }

    #[test]
    fn test_remove_strips_neighbours() {
        let mut graph = path_graph();
        graph.remove(&ids(&[2])).unwrap();

        assert_eq!(graph.len(), 3);
        assert!(graph.get(NodeId(1)).unwrap().connects().is_empty());
        assert_eq!(graph.get(NodeId(3)).unwrap().connects(), &ids(&[4])[..]);
    }

    #[test]
    fn test_remove_connected_batch() {
        let mut graph = path_graph();
        graph.remove(&ids(&[2, 3, 3])).unwrap();

        assert_eq!(graph.keys().collect::<Vec<_>>(), ids(&[1, 4]));
        assert_eq!(graph.num_edges(), 0);
    }

    #[test]
    fn test_remove_missing_key_is_atomic() {
        let mut graph = path_graph();
        let err = graph.remove(&ids(&[1, 77])).unwrap_err();
        assert_eq!(err, GraphError::KeyNotFound(NodeId(77)));
        assert_eq!(graph, path_graph());
    }

    #[test]
    fn test_connect_and_disconnect() {
        let mut graph = path_graph();
        graph.connect(NodeId(1), NodeId(4)).unwrap();
        graph.connect(NodeId(4), NodeId(1)).unwrap();
        assert_eq!(graph.num_edges(), 4);
        assert!(graph.get(NodeId(4)).unwrap().is_connected_to(NodeId(1)));

        graph.disconnect(NodeId(4), NodeId(1)).unwrap();
        graph.disconnect(NodeId(4), NodeId(1)).unwrap();
        assert_eq!(graph.num_edges(), 3);
    }

    #[test]
    fn test_connect_errors() {
        let mut graph = path_graph();
        assert_eq!(
            graph.connect(NodeId(1), NodeId(1)).unwrap_err(),
            GraphError::SelfLoop(NodeId(1))
        );
        assert_eq!(
            graph.connect(NodeId(1), NodeId(8)).unwrap_err(),
            GraphError::KeyNotFound(NodeId(8))
        );
        assert_eq!(
            graph.disconnect(NodeId(9), NodeId(1)).unwrap_err(),
            GraphError::KeyNotFound(NodeId(9))
        );
    }

    #[test]
    fn test_map_positions() {
        let mut graph = path_graph();
        graph.map_positions(|i, j| (j, i));

        assert_eq!(graph.get(NodeId(4)).unwrap().position(), (3.0, 0.0));
        assert_eq!(graph.num_edges(), 3);
    }

    #[test]
    fn test_iter_ascending() {
        let graph = Graph::from_nodes(vec![
            (NodeId(9), Node::isolated(0.0, 0.0)),
            (NodeId(2), Node::isolated(0.0, 0.0)),
            (NodeId(5), Node::isolated(0.0, 0.0)),
        ]);
        let keys: Vec<_> = graph.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ids(&[2, 5, 9]));
    }
}
