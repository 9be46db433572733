//! Staged refinement of a raw skeleton graph
//!
//! Default stage order:
//!
//! ```text
//! merge (distance) → prune (degree) → cycle filter → prune (degree)
//!     → largest component → integrity diagnostic
//! ```
//!
//! Each stage runs on the same graph in place and is timed.

pub mod config;

pub use config::PipelineConfig;

use crate::algorithms::{
    degree_below, diagnose_graph, largest_component, mean_position, merge_all, prune_recursive,
    retain_cycle_members, within_distance, Diagnosis,
};
use crate::storage::Graph;
use anyhow::{Context, Result};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::info;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Merge nodes closer than the configured radius
    Merge,
    /// Recursively prune nodes below the configured degree
    PruneDegree,
    /// Keep only nodes on loops of the configured length
    CycleFilter,
    /// Keep only the largest connected component
    LargestComponent,
    /// Integrity diagnostic (read-only)
    Diagnose,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Merge => "merge",
            Self::PruneDegree => "prune_degree",
            Self::CycleFilter => "cycle_filter",
            Self::LargestComponent => "largest_component",
            Self::Diagnose => "diagnose",
        };
        f.write_str(name)
    }
}

/// Node counts and timing for one executed stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    /// Stage that ran
    pub stage: Stage,
    /// Node count on entry
    pub nodes_before: usize,
    /// Node count on exit
    pub nodes_after: usize,
    /// Wall-clock time spent
    pub elapsed: Duration,
}

/// Result of a full pipeline run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    stages: Vec<StageReport>,
    diagnosis: Diagnosis,
}

impl PipelineReport {
    /// Executed stages in order
    #[must_use]
    pub fn stages(&self) -> &[StageReport] {
        &self.stages
    }

    /// Final integrity diagnostic
    #[must_use]
    pub fn diagnosis(&self) -> &Diagnosis {
        &self.diagnosis
    }
}

/// Refinement pipeline
///
/// # Example
///
/// ```
/// use skelgraph::{Graph, NodeId, Pipeline, PipelineConfig};
///
/// // A 100 px square with a spur hanging off one corner
/// let mut graph = Graph::from_edge_list(
///     &[
///         (NodeId(1), 0.0, 0.0),
///         (NodeId(2), 0.0, 100.0),
///         (NodeId(3), 100.0, 100.0),
///         (NodeId(4), 100.0, 0.0),
///         (NodeId(5), 200.0, 0.0),
///     ],
///     &[
///         (NodeId(1), NodeId(2)),
///         (NodeId(2), NodeId(3)),
///         (NodeId(3), NodeId(4)),
///         (NodeId(4), NodeId(1)),
///         (NodeId(4), NodeId(5)),
///     ],
/// ).unwrap();
///
/// let report = Pipeline::new(PipelineConfig::default()).run(&mut graph).unwrap();
/// assert_eq!(graph.len(), 4);
/// assert!(report.diagnosis().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline from a configuration
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every enabled stage on `graph`
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid, a stage fails, or
    /// `require_integrity` is set and the final diagnostic fails
    pub fn run(&self, graph: &mut Graph) -> Result<PipelineReport> {
        self.config.validate()?;
        let config = &self.config;
        let mut stages = Vec::new();

        info!(nodes = graph.len(), edges = graph.num_edges(), "pipeline start");

        if config.merge {
            let radius = config.merge_radius;
            stages.push(run_stage(graph, Stage::Merge, |g| {
                merge_all(g, within_distance(radius), mean_position)
            })?);
        }

        let min_degree = config.min_degree;
        stages.push(run_stage(graph, Stage::PruneDegree, |g| {
            prune_recursive(g, degree_below(min_degree))
        })?);

        if config.cycle_filter {
            let cycle_length = config.cycle_length;
            stages.push(run_stage(graph, Stage::CycleFilter, |g| {
                retain_cycle_members(g, cycle_length)
            })?);
            stages.push(run_stage(graph, Stage::PruneDegree, |g| {
                prune_recursive(g, degree_below(min_degree))
            })?);
        }

        if config.keep_largest_component {
            stages.push(run_stage(graph, Stage::LargestComponent, largest_component)?);
        }

        let started = Instant::now();
        let diagnosis = diagnose_graph(graph);
        stages.push(StageReport {
            stage: Stage::Diagnose,
            nodes_before: graph.len(),
            nodes_after: graph.len(),
            elapsed: started.elapsed(),
        });

        info!(
            nodes = graph.len(),
            edges = graph.num_edges(),
            integrity_ok = diagnosis.is_ok(),
            "pipeline done"
        );

        if config.require_integrity {
            diagnosis
                .clone()
                .into_result()
                .context("refined graph failed integrity check")?;
        }

        Ok(PipelineReport { stages, diagnosis })
    }
}

fn run_stage<F>(graph: &mut Graph, stage: Stage, f: F) -> Result<StageReport>
where
    F: FnOnce(&mut Graph) -> crate::Result<usize>,
{
    let nodes_before = graph.len();
    let started = Instant::now();

    f(graph).with_context(|| format!("stage {stage} failed"))?;

    let report = StageReport {
        stage,
        nodes_before,
        nodes_after: graph.len(),
        elapsed: started.elapsed(),
    };
    info!(
        %stage,
        nodes_before,
        nodes_after = report.nodes_after,
        elapsed_us = u64::try_from(report.elapsed.as_micros()).unwrap_or(u64::MAX),
        "stage complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Node, NodeId};

    /// 3x3 lattice of 100 px cells (four unit squares), each lattice point
    /// doubled by a near-duplicate 2 px away, plus a spur and a far triangle
    fn noisy_lattice() -> Graph {
        let mut graph = Graph::new();
        let point = |r: u32, c: u32| NodeId(r * 3 + c + 1);
        for r in 0..3 {
            for c in 0..3 {
                let (i, j) = (f64::from(r) * 100.0, f64::from(c) * 100.0);
                graph.insert(point(r, c), Node::isolated(i, j)).unwrap();
                graph
                    .insert(NodeId(100 + point(r, c).0), Node::new(i + 2.0, j, vec![point(r, c)]))
                    .unwrap();
            }
        }
        for r in 0..3 {
            for c in 0..3 {
                if c + 1 < 3 {
                    graph.connect(point(r, c), point(r, c + 1)).unwrap();
                }
                if r + 1 < 3 {
                    graph.connect(point(r, c), point(r + 1, c)).unwrap();
                }
            }
        }

        // Spur off the corner
        graph.insert(NodeId(50), Node::new(-100.0, 0.0, vec![point(0, 0)])).unwrap();

        // Far triangle
        graph.insert(NodeId(60), Node::isolated(1000.0, 1000.0)).unwrap();
        graph.insert(NodeId(61), Node::new(1000.0, 1100.0, vec![NodeId(60)])).unwrap();
        graph
            .insert(NodeId(62), Node::new(1100.0, 1000.0, vec![NodeId(60), NodeId(61)]))
            .unwrap();

        graph
    }

    #[test]
    fn test_default_pipeline_recovers_lattice() {
        let mut graph = noisy_lattice();
        let report = Pipeline::default().run(&mut graph).unwrap();

        assert_eq!(graph.len(), 9);
        assert_eq!(graph.num_edges(), 12);
        assert!(graph.keys().all(|k| k.0 <= 9));
        assert!(report.diagnosis().is_ok());

        let stages: Vec<Stage> = report.stages().iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            vec![
                Stage::Merge,
                Stage::PruneDegree,
                Stage::CycleFilter,
                Stage::PruneDegree,
                Stage::LargestComponent,
                Stage::Diagnose,
            ]
        );
        assert_eq!(report.stages()[0].nodes_before, 22);
        assert_eq!(report.stages()[0].nodes_after, 13);
        assert_eq!(report.stages()[1].nodes_after, 12);
    }

    #[test]
    fn test_merged_positions_are_means() {
        let mut graph = noisy_lattice();
        Pipeline::default().run(&mut graph).unwrap();

        assert_eq!(graph.get(NodeId(1)).unwrap().position(), (1.0, 0.0));
        assert_eq!(graph.get(NodeId(9)).unwrap().position(), (201.0, 200.0));
    }

    #[test]
    fn test_stage_toggles() {
        let mut graph = noisy_lattice();
        let config = PipelineConfig {
            merge: false,
            cycle_filter: false,
            keep_largest_component: false,
            ..PipelineConfig::default()
        };

        let report = Pipeline::new(config).run(&mut graph).unwrap();

        // Only the degree prune ran: duplicates and the spur go, triangle stays
        assert_eq!(report.stages().len(), 2);
        assert_eq!(graph.len(), 12);
    }

    #[test]
    fn test_integrity_gate() {
        let mut graph = Graph::from_nodes(vec![
            (NodeId(1), Node::new(0.0, 0.0, vec![NodeId(2), NodeId(3)])),
            (NodeId(2), Node::new(0.0, 100.0, vec![NodeId(3)])),
            (NodeId(3), Node::new(100.0, 0.0, vec![NodeId(1), NodeId(2)])),
        ]);
        // 1 lists 2 without a back reference; no stage touches the graph
        let config = PipelineConfig {
            merge: false,
            min_degree: 0,
            cycle_filter: false,
            keep_largest_component: false,
            ..PipelineConfig::default()
        };

        let err = Pipeline::new(config.clone()).run(&mut graph.clone()).unwrap_err();
        assert!(err.to_string().contains("integrity"));

        let lenient = PipelineConfig {
            require_integrity: false,
            ..config
        };
        let report = Pipeline::new(lenient).run(&mut graph).unwrap();
        assert!(!report.diagnosis().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig {
            cycle_length: 1,
            ..PipelineConfig::default()
        };
        assert!(Pipeline::new(config).run(&mut Graph::new()).is_err());
    }
}
