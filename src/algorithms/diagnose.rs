//! Read-only integrity diagnostic
//!
//! Checks the closure, self-loop and symmetry invariants of a graph and
//! reports what it finds. Meant to run after a pipeline stage as an assertion
//! gate; it never mutates the graph.

use crate::error::{GraphError, Result};
use crate::storage::{Graph, NodeId};
use std::fmt;
use tracing::{debug, warn};

/// A broken invariant found by [`diagnose_graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// `from` lists `to`, but `to` is not in the graph
    Dangling {
        /// Node holding the reference
        from: NodeId,
        /// Missing key
        to: NodeId,
    },
    /// `from` lists `to`, but `to` does not list `from`
    Asymmetric {
        /// Node holding the reference
        from: NodeId,
        /// Node missing the back reference
        to: NodeId,
    },
    /// Node lists itself as a neighbour
    SelfLoop {
        /// Offending node
        key: NodeId,
    },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dangling { from, to } => {
                write!(f, "{from} connects to {to}, but {to} is not in graph")
            }
            Self::Asymmetric { from, to } => {
                write!(f, "{from} connects to {to}, but {to} does not connect to {from}")
            }
            Self::SelfLoop { key } => write!(f, "{key} connects to itself"),
        }
    }
}

/// Outcome of [`diagnose_graph`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnosis {
    violations: Vec<IntegrityViolation>,
}

impl Diagnosis {
    /// Whether no violation was found
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations in scan order
    #[must_use]
    pub fn violations(&self) -> &[IntegrityViolation] {
        &self.violations
    }

    /// Convert into a `Result` for use as a pipeline gate
    ///
    /// # Errors
    ///
    /// Returns `IntegrityViolation` carrying the count and first violation
    pub fn into_result(self) -> Result<()> {
        match self.violations.first() {
            None => Ok(()),
            Some(&first) => Err(GraphError::IntegrityViolation {
                count: self.violations.len(),
                first,
            }),
        }
    }
}

/// Check the graph's integrity invariants
///
/// Keys are scanned in ascending order. For each key, every neighbour is
/// first checked for presence: the first dangling reference is recorded and
/// ends the scan, since later checks would chase missing keys. Self-loops and
/// asymmetric connections are all recorded and the scan continues.
///
/// # Example
///
/// ```
/// use skelgraph::{diagnose_graph, Graph, Node, NodeId};
///
/// // 1 lists 2, but 2 does not list 1
/// let graph = Graph::from_nodes(vec![
///     (NodeId(1), Node::new(0.0, 0.0, vec![NodeId(2)])),
///     (NodeId(2), Node::isolated(1.0, 1.0)),
/// ]);
///
/// let diagnosis = diagnose_graph(&graph);
/// assert!(!diagnosis.is_ok());
/// assert_eq!(diagnosis.violations().len(), 1);
/// ```
#[must_use]
pub fn diagnose_graph(graph: &Graph) -> Diagnosis {
    let mut violations = Vec::new();

    for (key, node) in graph.iter() {
        if let Some(&missing) = node.connects().iter().find(|k| !graph.contains(**k)) {
            let violation = IntegrityViolation::Dangling { from: key, to: missing };
            warn!(%violation, "graph integrity");
            violations.push(violation);
            return Diagnosis { violations };
        }

        for &neighbor in node.connects() {
            let violation = if neighbor == key {
                IntegrityViolation::SelfLoop { key }
            } else if graph
                .get(neighbor)
                .is_ok_and(|other| !other.is_connected_to(key))
            {
                IntegrityViolation::Asymmetric { from: key, to: neighbor }
            } else {
                continue;
            };

            warn!(%violation, "graph integrity");
            violations.push(violation);
        }
    }

    if violations.is_empty() {
        debug!(nodes = graph.len(), edges = graph.num_edges(), "graph integrity ok");
    }

    Diagnosis { violations }
}
