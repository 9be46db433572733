//! Bounded multi-path breadth-first search and cycle-membership filtering
//!
//! The search advances a set of crawlers (partial paths) in lock step. Each
//! crawler may step to any neighbour of its tail except the node it just came
//! from. There is no global visited set, so longer non-simple walks are
//! explored; the failure predicate bounds the depth.
//!
//! ```text
//! 1 ─ 2        start 1, success "tail == 1", fail "5 keys"
//! │   │
//! 4 ─ 3        round 4: [1,2,3,4,1] and [1,4,3,2,1] succeed
//! ```

use crate::error::Result;
use crate::storage::{Graph, Node, NodeId};
use tracing::debug;

/// Search for paths from `start` until `success` holds for some crawler
///
/// Every round evaluates `success(tail, path)` for all crawlers first; if any
/// hold, all successful paths of that round are returned. Otherwise crawlers
/// for which `fail(tail, path)` holds are dropped and the rest are advanced.
/// An empty result means the search space was exhausted.
///
/// # Arguments
///
/// * `graph` - Graph to search
/// * `start` - Origin key; every path begins `[start, first_hop, ..]`
/// * `success` - Predicate on the tail node and the path reaching it
/// * `fail` - Cutoff predicate, same signature
///
/// # Errors
///
/// Returns `KeyNotFound` if `start` is absent or a crawler reaches a
/// dangling reference
///
/// # Example
///
/// ```
/// use skelgraph::{breadth_first_search, Graph, NodeId};
///
/// let graph = Graph::from_edge_list(
///     &[(NodeId(1), 0.0, 0.0), (NodeId(2), 0.0, 1.0), (NodeId(3), 1.0, 1.0), (NodeId(4), 1.0, 0.0)],
///     &[(NodeId(1), NodeId(2)), (NodeId(2), NodeId(3)), (NodeId(3), NodeId(4)), (NodeId(4), NodeId(1))],
/// ).unwrap();
///
/// let paths = breadth_first_search(
///     &graph,
///     NodeId(1),
///     |_, path| path.last() == Some(&NodeId(1)),
///     |_, path| path.len() == 5,
/// ).unwrap();
///
/// assert_eq!(paths.len(), 2);
/// assert!(paths.iter().all(|p| p.len() == 5));
/// ```
pub fn breadth_first_search<S, F>(
    graph: &Graph,
    start: NodeId,
    mut success: S,
    mut fail: F,
) -> Result<Vec<Vec<NodeId>>>
where
    S: FnMut(&Node, &[NodeId]) -> bool,
    F: FnMut(&Node, &[NodeId]) -> bool,
{
    let mut crawlers: Vec<Vec<NodeId>> = graph
        .get(start)?
        .connects()
        .iter()
        .map(|&hop| vec![start, hop])
        .collect();

    while !crawlers.is_empty() {
        let mut found = Vec::new();
        for crawler in &crawlers {
            if success(tail_node(graph, crawler)?, crawler) {
                found.push(crawler.clone());
            }
        }
        if !found.is_empty() {
            return Ok(found);
        }

        let mut next = Vec::with_capacity(crawlers.len());
        for crawler in crawlers {
            let tail = tail_node(graph, &crawler)?;
            if fail(tail, &crawler) {
                continue;
            }
            march_forward(tail, crawler, &mut next);
        }
        crawlers = next;
    }

    Ok(Vec::new())
}

fn tail_node<'g>(graph: &'g Graph, crawler: &[NodeId]) -> Result<&'g Node> {
    // Crawlers always hold at least [start, hop]
    let tail = crawler[crawler.len() - 1];
    graph.get(tail)
}

/// Extend `crawler` to every neighbour of `tail` except the one it came from
fn march_forward(tail: &Node, crawler: Vec<NodeId>, next: &mut Vec<Vec<NodeId>>) {
    let previous = crawler[crawler.len() - 2];
    let mut options = tail.connects().to_vec();
    if let Some(back) = options.iter().position(|k| *k == previous) {
        options.remove(back);
    }

    for hop in options {
        let mut extended = Vec::with_capacity(crawler.len() + 1);
        extended.extend_from_slice(&crawler);
        extended.push(hop);
        next.push(extended);
    }
}

/// Whether `key` lies on a closed walk of exactly `cycle_len` edges
///
/// Runs [`breadth_first_search`] from `key` with success "path returns to
/// `key`" and failure "path holds `cycle_len + 1` keys". The node qualifies
/// when the search returns paths and all of them have `cycle_len + 1` keys.
/// A shorter loop found first disqualifies the node.
///
/// # Errors
///
/// Returns `KeyNotFound` if `key` is absent
pub fn on_cycle_of_length(graph: &Graph, key: NodeId, cycle_len: usize) -> Result<bool> {
    let target_len = cycle_len + 1;
    let paths = breadth_first_search(
        graph,
        key,
        |_, path| path.last() == Some(&key),
        |_, path| path.len() == target_len,
    )?;

    Ok(!paths.is_empty() && paths.iter().all(|p| p.len() == target_len))
}

/// Remove every node that does not lie on a closed walk of `cycle_len` edges
///
/// All nodes are tested against the graph as it is before any removal, then
/// failing nodes are removed in one batch. With `cycle_len = 4` this keeps
/// only nodes on quadrilateral loops.
///
/// # Returns
///
/// Number of nodes removed
///
/// # Errors
///
/// Returns `KeyNotFound` only if the graph violates the closure invariant
pub fn retain_cycle_members(graph: &mut Graph, cycle_len: usize) -> Result<usize> {
    let mut removal = Vec::new();
    for key in graph.keys() {
        if !on_cycle_of_length(graph, key, cycle_len)? {
            removal.push(key);
        }
    }

    graph.remove(&removal)?;
    debug!(
        cycle_len,
        removed = removal.len(),
        remaining = graph.len(),
        "cycle filter"
    );

    Ok(removal.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;

    fn cycle(n: u32) -> Graph {
        let nodes: Vec<_> = (1..=n).map(|k| (NodeId(k), f64::from(k), 0.0)).collect();
        let edges: Vec<_> = (1..=n).map(|k| (NodeId(k), NodeId(k % n + 1))).collect();
        Graph::from_edge_list(&nodes, &edges).unwrap()
    }

    fn returns_to(key: NodeId) -> impl FnMut(&Node, &[NodeId]) -> bool {
        move |_, path| path.last() == Some(&key)
    }

    fn max_len(len: usize) -> impl FnMut(&Node, &[NodeId]) -> bool {
        move |_, path| path.len() == len
    }

    fn ids(raw: &[u32]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn test_square_returns_both_directions() {
        let graph = cycle(4);

        let paths =
            breadth_first_search(&graph, NodeId(1), returns_to(NodeId(1)), max_len(5)).unwrap();

        assert_eq!(paths, vec![ids(&[1, 2, 3, 4, 1]), ids(&[1, 4, 3, 2, 1])]);
    }

    #[test]
    fn test_triangle_has_no_length_five_path() {
        let graph = cycle(3);

        let paths =
            breadth_first_search(&graph, NodeId(1), returns_to(NodeId(1)), max_len(5)).unwrap();

        assert!(!paths.is_empty());
        assert!(paths.iter().all(|p| p.len() == 4));
        assert!(!on_cycle_of_length(&graph, NodeId(1), 4).unwrap());
    }

    #[test]
    fn test_pentagon_cut_off_before_return() {
        let graph = cycle(5);

        let paths =
            breadth_first_search(&graph, NodeId(1), returns_to(NodeId(1)), max_len(5)).unwrap();

        assert!(paths.is_empty());
    }

    #[test]
    fn test_dead_end_exhausts() {
        // 1 - 2 - 3 chain: crawlers die at the ends
        let graph = Graph::from_edge_list(
            &[(NodeId(1), 0.0, 0.0), (NodeId(2), 0.0, 1.0), (NodeId(3), 0.0, 2.0)],
            &[(NodeId(1), NodeId(2)), (NodeId(2), NodeId(3))],
        )
        .unwrap();

        let paths =
            breadth_first_search(&graph, NodeId(2), returns_to(NodeId(2)), |_, _| false).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_isolated_start_is_empty() {
        let graph = Graph::from_nodes(vec![(NodeId(1), Node::isolated(0.0, 0.0))]);
        let paths = breadth_first_search(&graph, NodeId(1), |_, _| true, |_, _| false).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_missing_start() {
        let graph = cycle(4);
        let err = breadth_first_search(&graph, NodeId(9), |_, _| true, |_, _| false).unwrap_err();
        assert_eq!(err, GraphError::KeyNotFound(NodeId(9)));
    }

    #[test]
    fn test_success_checked_before_fail() {
        let graph = cycle(4);

        // Success and failure both hold at length 5; success wins
        let paths =
            breadth_first_search(&graph, NodeId(1), returns_to(NodeId(1)), max_len(5)).unwrap();
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_non_simple_walks_are_explored() {
        // Lollipop: triangle 1-2-3 with stem 3-4. From 4 the walk
        // 4,3,1,2,3 revisits 3 before coming back.
        let graph = Graph::from_edge_list(
            &[
                (NodeId(1), 0.0, 0.0),
                (NodeId(2), 0.0, 1.0),
                (NodeId(3), 1.0, 0.0),
                (NodeId(4), 2.0, 0.0),
            ],
            &[
                (NodeId(1), NodeId(2)),
                (NodeId(2), NodeId(3)),
                (NodeId(3), NodeId(1)),
                (NodeId(3), NodeId(4)),
            ],
        )
        .unwrap();

        let paths = breadth_first_search(
            &graph,
            NodeId(4),
            |_, path| path.len() == 5 && path.last() == Some(&NodeId(3)),
            max_len(6),
        )
        .unwrap();

        assert_eq!(paths, vec![ids(&[4, 3, 2, 1, 3]), ids(&[4, 3, 1, 2, 3])]);
    }

    #[test]
    fn test_retain_cycle_members_keeps_square() {
        // Square 1-2-3-4 and triangle 5-6-7 joined by the bridge 2-5
        let graph_nodes: Vec<_> = (1..=7).map(|k| (NodeId(k), f64::from(k), 0.0)).collect();
        let mut graph = Graph::from_edge_list(
            &graph_nodes,
            &[
                (NodeId(1), NodeId(2)),
                (NodeId(2), NodeId(3)),
                (NodeId(3), NodeId(4)),
                (NodeId(4), NodeId(1)),
                (NodeId(5), NodeId(6)),
                (NodeId(6), NodeId(7)),
                (NodeId(7), NodeId(5)),
                (NodeId(2), NodeId(5)),
            ],
        )
        .unwrap();

        let removed = retain_cycle_members(&mut graph, 4).unwrap();

        assert_eq!(removed, 3);
        assert_eq!(graph.keys().collect::<Vec<_>>(), ids(&[1, 2, 3, 4]));
        assert_eq!(graph.num_edges(), 4);
    }
}
