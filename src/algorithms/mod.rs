//! Graph algorithms (pruning, merging, bounded search, components, diagnostics)
//!
//! Every mutating algorithm takes the graph by exclusive reference and leaves
//! it with the symmetry and closure invariants intact.

pub mod diagnose;
pub mod merge;
pub mod prune;
pub mod search;
pub mod structure;
pub mod traversal;

pub use diagnose::{diagnose_graph, Diagnosis, IntegrityViolation};
pub use merge::{mean_position, merge_all, merge_neighbours, within_distance};
pub use prune::{degree_below, prune, prune_recursive};
pub use search::{breadth_first_search, on_cycle_of_length, retain_cycle_members};
pub use structure::{connected_components, largest_component};
pub use traversal::{bfs, dfs};
