//! Graph traversal (BFS, DFS) with a visited set
//!
//! Frontier-based reachability; neighbours are expanded in adjacency order.

use crate::error::Result;
use crate::storage::{Graph, NodeId};
use std::collections::{HashSet, VecDeque};

/// Breadth-First Search from source node
///
/// # Returns
///
/// Every node reachable from `source`, in visiting order (source first)
///
/// # Errors
///
/// Returns `KeyNotFound` if `source` is absent or a dangling reference is
/// reached
///
/// # Example
///
/// ```
/// use skelgraph::{bfs, Graph, NodeId};
///
/// // 0 - 1, 0 - 2, 1 - 3
/// let graph = Graph::from_edge_list(
///     &[(NodeId(0), 0.0, 0.0), (NodeId(1), 0.0, 1.0), (NodeId(2), 1.0, 0.0), (NodeId(3), 0.0, 2.0)],
///     &[(NodeId(0), NodeId(1)), (NodeId(0), NodeId(2)), (NodeId(1), NodeId(3))],
/// ).unwrap();
///
/// let order = bfs(&graph, NodeId(0)).unwrap();
/// assert_eq!(order, vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
/// ```
pub fn bfs(graph: &Graph, source: NodeId) -> Result<Vec<NodeId>> {
    graph.get(source)?;

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    let mut order = Vec::new();

    queue.push_back(source);
    visited.insert(source);

    while let Some(current) = queue.pop_front() {
        order.push(current);

        for &neighbor in graph.get(current)?.connects() {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    Ok(order)
}

/// Depth-First Search from source node
///
/// Stack-based; a node's neighbours are pushed in adjacency order, so the
/// last-listed neighbour is explored first.
///
/// # Errors
///
/// Returns `KeyNotFound` if `source` is absent or a dangling reference is
/// reached
pub fn dfs(graph: &Graph, source: NodeId) -> Result<Vec<NodeId>> {
    graph.get(source)?;

    let mut visited = HashSet::new();
    let mut stack = vec![source];
    let mut order = Vec::new();

    visited.insert(source);

    while let Some(current) = stack.pop() {
        order.push(current);

        for &neighbor in graph.get(current)?.connects() {
            if visited.insert(neighbor) {
                stack.push(neighbor);
            }
        }
    }

    Ok(order)
}
