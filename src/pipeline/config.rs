//! Pipeline configuration (TOML)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for [`Pipeline`](super::Pipeline)
///
/// Every field has a default, so an empty TOML document is valid.
///
/// ```toml
/// merge_radius = 30.0
/// min_degree = 2
/// cycle_length = 4
/// keep_largest_component = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run the distance merge stage
    #[serde(default = "default_true")]
    pub merge: bool,
    /// Nodes closer than this (Euclidean, pixels) are merged
    #[serde(default = "default_merge_radius")]
    pub merge_radius: f64,
    /// Nodes with fewer connections are pruned recursively
    #[serde(default = "default_min_degree")]
    pub min_degree: usize,
    /// Run the cycle-membership filter (followed by a second prune)
    #[serde(default = "default_true")]
    pub cycle_filter: bool,
    /// Loop length, in edges, a node must lie on to survive the filter
    #[serde(default = "default_cycle_length")]
    pub cycle_length: usize,
    /// Keep only the largest connected component
    #[serde(default = "default_true")]
    pub keep_largest_component: bool,
    /// Fail the run when the final integrity diagnostic fails
    #[serde(default = "default_true")]
    pub require_integrity: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            merge: true,
            merge_radius: default_merge_radius(),
            min_degree: default_min_degree(),
            cycle_filter: true,
            cycle_length: default_cycle_length(),
            keep_largest_component: true,
            require_integrity: true,
        }
    }
}

const fn default_true() -> bool {
    true
}
const fn default_merge_radius() -> f64 {
    30.0
}
const fn default_min_degree() -> usize {
    2
}
const fn default_cycle_length() -> usize {
    4
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns error if the document is malformed or fails [`validate`](Self::validate)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("invalid pipeline config")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or fails validation
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns error if `merge_radius` is not a positive finite number or
    /// `cycle_length < 3`
    pub fn validate(&self) -> Result<()> {
        if !(self.merge_radius.is_finite() && self.merge_radius > 0.0) {
            bail!("merge_radius must be positive, got {}", self.merge_radius);
        }
        if self.cycle_length < 3 {
            bail!("cycle_length must be at least 3, got {}", self.cycle_length);
        }
        Ok(())
    }
}
