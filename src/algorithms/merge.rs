//! Connectivity-preserving node merging
//!
//! Both sweeps capture the key order up front and visit each key once. For a
//! live pivot they collect a merge group, compute the merged position with the
//! caller's aggregator, and replace the group with a single node under the
//! pivot key. The replacement goes through [`Graph::remove`] and
//! [`Graph::insert`], so symmetry holds after every group.
//!
//! ```text
//! before (radius 5):  1 ─ 2 ─────── 3 ─ 4     1 at 0, 2 at 1, 3 at 50, 4 at 51
//! after:              1 ─────────── 3         1 at 0.5, 3 at 50.5
//! ```

use crate::error::Result;
use crate::storage::{Graph, Node, NodeId};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Merge every node with all other nodes satisfying `condition`
///
/// Candidates are every other node present when the pivot is visited, so a
/// later pivot can absorb the result of an earlier merge. The aggregator
/// receives the pivot first, then the matches in ascending key order.
///
/// With the `parallel` feature the candidate scan runs on rayon; the result
/// is identical to the sequential scan.
///
/// # Returns
///
/// Number of nodes absorbed (input size minus output size)
///
/// # Errors
///
/// Returns `KeyNotFound` only if the graph violates the closure invariant
///
/// # Example
///
/// ```
/// use skelgraph::{mean_position, merge_all, within_distance, Graph, NodeId};
///
/// let mut graph = Graph::from_edge_list(
///     &[(NodeId(1), 0.0, 0.0), (NodeId(2), 0.0, 2.0), (NodeId(3), 0.0, 40.0)],
///     &[(NodeId(1), NodeId(2)), (NodeId(2), NodeId(3))],
/// ).unwrap();
///
/// let absorbed = merge_all(&mut graph, within_distance(5.0), mean_position).unwrap();
/// assert_eq!(absorbed, 1);
/// assert_eq!(graph.get(NodeId(1)).unwrap().position(), (0.0, 1.0));
/// assert_eq!(graph.get(NodeId(1)).unwrap().connects(), &[NodeId(3)]);
/// ```
pub fn merge_all<C, A>(graph: &mut Graph, condition: C, mut aggregator: A) -> Result<usize>
where
    C: Fn(&Node, &Node) -> bool + Sync,
    A: FnMut(&[&Node]) -> (f64, f64),
{
    let keys: Vec<NodeId> = graph.keys().collect();
    let mut absorbed = 0;

    for pivot in keys {
        // Already consumed by an earlier group
        let Ok(pivot_node) = graph.get(pivot) else {
            continue;
        };

        let matches = scan_all(graph, pivot, pivot_node, &condition);
        absorbed += commit_group(graph, pivot, matches, &mut aggregator)?;
    }

    debug!(absorbed, remaining = graph.len(), "merge_all sweep");
    Ok(absorbed)
}

/// Merge every node with those of its current neighbours satisfying `condition`
///
/// Same mechanics as [`merge_all`], restricted to the pivot's adjacency list.
/// The aggregator receives the pivot first, then the matches in adjacency
/// order.
///
/// # Returns
///
/// Number of nodes absorbed
///
/// # Errors
///
/// Returns `KeyNotFound` only if the graph violates the closure invariant
pub fn merge_neighbours<C, A>(graph: &mut Graph, condition: C, mut aggregator: A) -> Result<usize>
where
    C: Fn(&Node, &Node) -> bool,
    A: FnMut(&[&Node]) -> (f64, f64),
{
    let keys: Vec<NodeId> = graph.keys().collect();
    let mut absorbed = 0;

    for pivot in keys {
        let Ok(pivot_node) = graph.get(pivot) else {
            continue;
        };

        let mut matches = Vec::new();
        for &neighbour in pivot_node.connects() {
            if condition(pivot_node, graph.get(neighbour)?) {
                matches.push(neighbour);
            }
        }

        absorbed += commit_group(graph, pivot, matches, &mut aggregator)?;
    }

    debug!(absorbed, remaining = graph.len(), "merge_neighbours sweep");
    Ok(absorbed)
}

#[cfg(not(feature = "parallel"))]
fn scan_all<C>(graph: &Graph, pivot: NodeId, pivot_node: &Node, condition: &C) -> Vec<NodeId>
where
    C: Fn(&Node, &Node) -> bool + Sync,
{
    graph
        .iter()
        .filter(|(key, node)| *key != pivot && condition(pivot_node, node))
        .map(|(key, _)| key)
        .collect()
}

#[cfg(feature = "parallel")]
fn scan_all<C>(graph: &Graph, pivot: NodeId, pivot_node: &Node, condition: &C) -> Vec<NodeId>
where
    C: Fn(&Node, &Node) -> bool + Sync,
{
    let candidates: Vec<(NodeId, &Node)> = graph.iter().filter(|(key, _)| *key != pivot).collect();

    // Indexed collect keeps ascending key order
    candidates
        .par_iter()
        .filter(|(_, node)| condition(pivot_node, node))
        .map(|(key, _)| *key)
        .collect()
}

/// Replace `pivot` and `matches` with one aggregated node under `pivot`
fn commit_group<A>(
    graph: &mut Graph,
    pivot: NodeId,
    matches: Vec<NodeId>,
    aggregator: &mut A,
) -> Result<usize>
where
    A: FnMut(&[&Node]) -> (f64, f64),
{
    if matches.is_empty() {
        return Ok(0);
    }

    let mut group = Vec::with_capacity(matches.len() + 1);
    group.push(pivot);
    group.extend(matches);

    let members = group
        .iter()
        .map(|key| graph.get(*key))
        .collect::<Result<Vec<&Node>>>()?;

    let (i, j) = aggregator(&members);
    let connects: Vec<NodeId> = members
        .iter()
        .flat_map(|node| node.connects().iter().copied())
        .filter(|key| !group.contains(key))
        .collect();

    graph.remove(&group)?;
    graph.insert(pivot, Node::new(i, j, connects))?;

    debug!(pivot = %pivot, group = group.len(), "merged group");
    Ok(group.len() - 1)
}

/// Arithmetic mean of node positions (the default merge aggregator)
///
/// An empty slice yields `(NaN, NaN)`.
#[must_use]
pub fn mean_position(nodes: &[&Node]) -> (f64, f64) {
    #[allow(clippy::cast_precision_loss)] // merge groups are far below 2^52 nodes
    let n = nodes.len() as f64;
    let (sum_i, sum_j) = nodes
        .iter()
        .fold((0.0, 0.0), |(si, sj), node| (si + node.i, sj + node.j));
    (sum_i / n, sum_j / n)
}

/// Condition matching node pairs closer than `radius` (Euclidean)
pub fn within_distance(radius: f64) -> impl Fn(&Node, &Node) -> bool + Copy + Sync {
    move |a, b| (a.i - b.i).hypot(a.j - b.j) < radius
}
