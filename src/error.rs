//! Error types for graph operations

use crate::algorithms::diagnose::IntegrityViolation;
use crate::storage::NodeId;
use thiserror::Error;

/// Errors raised by graph lookups and mutations
///
/// `KeyNotFound` and `DuplicateKey` indicate a composition bug (for example a
/// stale key after a merge). Operations check for them before mutating, so
/// the graph is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Operation referenced a key absent from the graph
    #[error("node {0} not found in graph")]
    KeyNotFound(NodeId),

    /// Insert targeted a key already present
    #[error("node {0} already present in graph")]
    DuplicateKey(NodeId),

    /// Attempted to connect a node to itself
    #[error("node {0} cannot connect to itself")]
    SelfLoop(NodeId),

    /// Integrity diagnostic failed (raised only by `Diagnosis::into_result`)
    #[error("graph integrity check failed with {count} violation(s), first: {first}")]
    IntegrityViolation {
        /// Number of violations found
        count: usize,
        /// First violation in scan order
        first: IntegrityViolation,
    },
}

/// Result alias for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
