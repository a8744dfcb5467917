//! Sweep configuration.
//!
//! Loaded from a YAML file, from `QFENCE_*` environment variables, or both
//! (file first, then environment overrides):
//!
//! ```yaml
//! width: 10
//! shots: 1000
//! concurrency: 4
//! operator: CZ
//! policy: local
//! seed: 42
//! edges: ["0-1", "1-2", "2-3"]
//! ```

use std::path::Path;

use qfence_ir::QubitPair;
use serde::{Deserialize, Serialize};

use crate::error::{LandscapeError, LandscapeResult};
use crate::graph::WeightedGraph;
use crate::grid::ParameterGrid;
use crate::pipeline::FencingPolicy;

/// Parameters of one fencing experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Grid points per axis.
    #[serde(default = "default_width")]
    pub width: usize,

    /// Repetitions per grid point.
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Requests in flight at once (1 = sequential).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Designated two-qubit operator.
    #[serde(default = "default_operator")]
    pub operator: String,

    /// Fencing policy.
    #[serde(default)]
    pub policy: FencingPolicy,

    /// Weighted-graph seed.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Problem graph edges.
    #[serde(default = "default_edges")]
    pub edges: Vec<QubitPair>,
}

fn default_width() -> usize {
    10
}

fn default_shots() -> u32 {
    1000
}

fn default_concurrency() -> usize {
    1
}

fn default_operator() -> String {
    "CZ".to_string()
}

fn default_seed() -> u64 {
    42
}

fn default_edges() -> Vec<QubitPair> {
    [(0u32, 1u32), (1, 2), (2, 3)]
        .into_iter()
        .filter_map(|(a, b)| QubitPair::new(a, b).ok())
        .collect()
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            shots: default_shots(),
            concurrency: default_concurrency(),
            operator: default_operator(),
            policy: FencingPolicy::default(),
            seed: default_seed(),
            edges: default_edges(),
        }
    }
}

impl SweepConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> LandscapeResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LandscapeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(contents: &str) -> LandscapeResult<Self> {
        let config: SweepConfig = serde_yaml_ng::from_str(contents)
            .map_err(|e| LandscapeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> LandscapeResult<Self> {
        Self::default().merge_env()
    }

    /// Optional file, then environment overrides.
    pub fn load(path: Option<&Path>) -> LandscapeResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.merge_env()
    }

    /// Apply `QFENCE_*` variables that are set, leaving other fields as they are.
    pub fn merge_env(self) -> LandscapeResult<Self> {
        self.merge_from(|key| std::env::var(key).ok())
    }

    fn merge_from(mut self, var: impl Fn(&str) -> Option<String>) -> LandscapeResult<Self> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> LandscapeResult<T> {
            value
                .trim()
                .parse()
                .map_err(|_| LandscapeError::Config(format!("{key}: cannot parse '{value}'")))
        }

        if let Some(v) = var("QFENCE_WIDTH") {
            self.width = parse("QFENCE_WIDTH", &v)?;
        }
        if let Some(v) = var("QFENCE_SHOTS") {
            self.shots = parse("QFENCE_SHOTS", &v)?;
        }
        if let Some(v) = var("QFENCE_CONCURRENCY") {
            self.concurrency = parse("QFENCE_CONCURRENCY", &v)?;
        }
        if let Some(v) = var("QFENCE_OPERATOR") {
            self.operator = v.trim().to_string();
        }
        if let Some(v) = var("QFENCE_POLICY") {
            self.policy = v.parse()?;
        }
        if let Some(v) = var("QFENCE_SEED") {
            self.seed = parse("QFENCE_SEED", &v)?;
        }
        if let Some(v) = var("QFENCE_EDGES") {
            self.edges = v
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| parse("QFENCE_EDGES", s))
                .collect::<LandscapeResult<_>>()?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> LandscapeResult<()> {
        if self.width == 0 {
            return Err(LandscapeError::Config("width must be positive".into()));
        }
        if self.shots == 0 {
            return Err(LandscapeError::Config("shots must be positive".into()));
        }
        if self.concurrency == 0 {
            return Err(LandscapeError::Config("concurrency must be positive".into()));
        }
        if self.operator.is_empty() {
            return Err(LandscapeError::Config("operator must not be empty".into()));
        }
        if self.edges.is_empty() {
            return Err(LandscapeError::Config("at least one edge is required".into()));
        }
        Ok(())
    }

    /// The parameter grid described by `width`.
    pub fn grid(&self) -> LandscapeResult<ParameterGrid> {
        ParameterGrid::new(self.width)
    }

    /// The weighted graph described by `edges` and `seed`.
    pub fn graph(&self) -> LandscapeResult<WeightedGraph> {
        WeightedGraph::build(self.edges.iter().copied(), self.seed)
    }
}
