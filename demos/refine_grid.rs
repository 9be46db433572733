//! Refine a synthetic blob-labelled grid into its structural lattice
//!
//! Showcases:
//! - Graph construction from blob centroids and edge-blob touches
//! - The default refinement pipeline with per-stage reports
//! - Loading the pipeline configuration from a TOML file
//!
//! Run with: `cargo run --example refine_grid [config.toml]`
//! Set `RUST_LOG=skelgraph=debug` to see every merge and prune pass.

use anyhow::Result;
use skelgraph::{connected_components, Graph, Pipeline, PipelineConfig};
use std::collections::{BTreeMap, BTreeSet};
use tracing_subscriber::EnvFilter;

/// Blob labelling output for a `side x side` junction lattice (60 px pitch)
///
/// Every junction on the main diagonal is split into two blobs 4 px apart,
/// and the last junction trails a two-node spur.
fn synthetic_blobs(side: u32) -> (BTreeMap<u32, (f64, f64)>, BTreeMap<u32, BTreeSet<u32>>) {
    let mut centroids = BTreeMap::new();
    let mut node_edges: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    let label = |r: u32, c: u32| r * side + c + 1;
    let mut next_blob = 10_000;
    let mut touch = |node_edges: &mut BTreeMap<u32, BTreeSet<u32>>, a: u32, b: u32| {
        node_edges.entry(a).or_default().insert(next_blob);
        node_edges.entry(b).or_default().insert(next_blob);
        next_blob += 1;
    };

    for r in 0..side {
        for c in 0..side {
            centroids.insert(label(r, c), (f64::from(r) * 60.0, f64::from(c) * 60.0));
        }
    }
    for r in 0..side {
        for c in 0..side {
            if c + 1 < side {
                touch(&mut node_edges, label(r, c), label(r, c + 1));
            }
            if r + 1 < side {
                touch(&mut node_edges, label(r, c), label(r + 1, c));
            }
        }
    }

    // Split diagonal junctions
    let twin_base = side * side + 1;
    for d in 0..side {
        let twin = twin_base + d;
        let (i, j) = centroids[&label(d, d)];
        centroids.insert(twin, (i + 4.0, j));
        touch(&mut node_edges, label(d, d), twin);
    }

    // Spur off the far corner
    let corner = label(side - 1, side - 1);
    let (i, j) = centroids[&corner];
    let spur = twin_base + side;
    centroids.insert(spur, (i + 60.0, j + 60.0));
    centroids.insert(spur + 1, (i + 120.0, j + 120.0));
    touch(&mut node_edges, corner, spur);
    touch(&mut node_edges, spur, spur + 1);

    (centroids, node_edges)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skelgraph=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    println!("skelgraph refinement demo");
    println!("─────────────────────────\n");

    let (centroids, node_edges) = synthetic_blobs(5);
    let mut graph = Graph::from_blobs(&centroids, &node_edges)?;
    println!(
        "Raw graph: {} nodes, {} edges, {} component(s)",
        graph.len(),
        graph.num_edges(),
        connected_components(&graph).len()
    );
    println!("Config: {config:?}\n");

    let report = Pipeline::new(config).run(&mut graph)?;

    println!("{:<20} {:>8} {:>8} {:>12}", "stage", "before", "after", "elapsed");
    for stage in report.stages() {
        println!(
            "{:<20} {:>8} {:>8} {:>12?}",
            stage.stage.to_string(),
            stage.nodes_before,
            stage.nodes_after,
            stage.elapsed
        );
    }

    println!(
        "\nRefined graph: {} nodes, {} edges, integrity {}",
        graph.len(),
        graph.num_edges(),
        if report.diagnosis().is_ok() { "ok" } else { "FAILED" }
    );
    for violation in report.diagnosis().violations() {
        println!("  {violation}");
    }

    println!("\nNodes:");
    for (key, node) in &graph {
        let neighbours: Vec<String> = node.connects().iter().map(ToString::to_string).collect();
        println!("  {key:>3} at ({:>6.1}, {:>6.1}) -> [{}]", node.i, node.j, neighbours.join(", "));
    }

    Ok(())
}
