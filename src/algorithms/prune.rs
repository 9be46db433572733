//! Predicate-driven node pruning
//!
//! A single [`prune`] pass evaluates the predicate against the graph as it is
//! before any removal, then removes every match as one batch.
//! [`prune_recursive`] repeats passes until one removes nothing, which catches
//! nodes whose degree dropped because a neighbour was pruned.

use crate::error::Result;
use crate::storage::{Graph, Node, NodeId};
use tracing::debug;

/// Remove every node for which `predicate` holds (single pass)
///
/// # Returns
///
/// Number of nodes removed
///
/// # Errors
///
/// Propagates errors from [`Graph::remove`] (not expected on a consistent graph)
///
/// # Example
///
/// ```
/// use skelgraph::{prune, Graph, NodeId};
///
/// // 0 - 1 - 2
/// let mut graph = Graph::from_edge_list(
///     &[(NodeId(0), 0.0, 0.0), (NodeId(1), 0.0, 1.0), (NodeId(2), 0.0, 2.0)],
///     &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))],
/// ).unwrap();
///
/// let removed = prune(&mut graph, |node| node.degree() < 2).unwrap();
/// assert_eq!(removed, 2);
/// assert_eq!(graph.keys().collect::<Vec<_>>(), vec![NodeId(1)]);
/// ```
pub fn prune<P>(graph: &mut Graph, mut predicate: P) -> Result<usize>
where
    P: FnMut(&Node) -> bool,
{
    let targets: Vec<NodeId> = graph
        .iter()
        .filter(|(_, node)| predicate(node))
        .map(|(key, _)| key)
        .collect();

    graph.remove(&targets)?;
    Ok(targets.len())
}

/// Repeat [`prune`] until a pass removes nothing
///
/// Terminates on any finite graph since every pass that continues the loop
/// strictly shrinks it.
///
/// # Returns
///
/// Total number of nodes removed across all passes
///
/// # Errors
///
/// Propagates errors from [`Graph::remove`]
pub fn prune_recursive<P>(graph: &mut Graph, mut predicate: P) -> Result<usize>
where
    P: FnMut(&Node) -> bool,
{
    let mut total = 0;
    let mut pass = 0;

    loop {
        let removed = prune(graph, &mut predicate)?;
        pass += 1;
        debug!(pass, removed, remaining = graph.len(), "prune pass");

        if removed == 0 {
            break;
        }
        total += removed;
    }

    Ok(total)
}

/// Predicate matching nodes with fewer than `min` connections
pub fn degree_below(min: usize) -> impl Fn(&Node) -> bool + Copy {
    move |node| node.degree() < min
}
