//! Graph structure algorithms: connected components
//!
//! - `connected_components`: all components in discovery order
//! - `largest_component`: keep only the biggest one
//!
//! # Example
//!
//! ```
//! use skelgraph::{connected_components, largest_component, Graph, NodeId};
//!
//! // Two components: 0 - 1 - 2 and 3 - 4
//! let nodes: Vec<_> = (0..5).map(|k| (NodeId(k), 0.0, 0.0)).collect();
//! let edges = [(0, 1), (1, 2), (3, 4)].map(|(a, b)| (NodeId(a), NodeId(b)));
//! let mut graph = Graph::from_edge_list(&nodes, &edges).unwrap();
//!
//! assert_eq!(connected_components(&graph).len(), 2);
//!
//! largest_component(&mut graph).unwrap();
//! assert_eq!(graph.keys().collect::<Vec<_>>(), vec![NodeId(0), NodeId(1), NodeId(2)]);
//! ```

use crate::error::Result;
use crate::storage::{Graph, NodeId};
use std::collections::BTreeSet;
use tracing::debug;

/// Find all connected components
///
/// Repeatedly seeds a flood fill from the smallest unvisited key and expands
/// a frontier through the adjacency lists, deduplicating against a global
/// visited set. Components come back in discovery order; keys within a
/// component are in flood-fill order. Dangling references are skipped.
#[must_use]
pub fn connected_components(graph: &Graph) -> Vec<Vec<NodeId>> {
    let mut visited = BTreeSet::new();
    let mut components = Vec::new();

    for seed in graph.keys() {
        if visited.contains(&seed) {
            continue;
        }

        visited.insert(seed);
        let mut component = vec![seed];
        let mut frontier = vec![seed];

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for key in frontier {
                let Ok(node) = graph.get(key) else {
                    continue;
                };
                for &neighbor in node.connects() {
                    if graph.contains(neighbor) && visited.insert(neighbor) {
                        component.push(neighbor);
                        next.push(neighbor);
                    }
                }
            }
            frontier = next;
        }

        components.push(component);
    }

    components
}

/// Keep only the largest connected component
///
/// On a size tie the first discovered component wins, i.e. the one holding
/// the smallest key. An empty graph is left as is.
///
/// # Returns
///
/// Number of nodes removed
///
/// # Errors
///
/// Propagates errors from [`Graph::remove`]
pub fn largest_component(graph: &mut Graph) -> Result<usize> {
    let components = connected_components(graph);

    let mut largest: Option<&Vec<NodeId>> = None;
    for component in &components {
        if largest.map_or(true, |best| component.len() > best.len()) {
            largest = Some(component);
        }
    }

    let Some(keep) = largest else {
        return Ok(0);
    };

    let keep: BTreeSet<NodeId> = keep.iter().copied().collect();
    let removed = graph.retain_keys(&keep)?;

    debug!(
        components = components.len(),
        kept = keep.len(),
        removed,
        "largest component"
    );

    Ok(removed)
}
