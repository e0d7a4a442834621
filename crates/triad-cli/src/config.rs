//! CLI configuration.
//!
//! Layered as: built-in defaults, then an optional JSON file, then
//! environment variables.
//!
//! | Variable | Field |
//! |---|---|
//! | `TRIAD_DT` | `dt` |
//! | `TRIAD_STEPS` | `steps` |
//! | `TRIAD_EPSILON` | `simulator.epsilon` |
//! | `TRIAD_WINDOW` | `window` |
//! | `TRIAD_THRESHOLD` | `threshold` |

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use triad_consensus::{SimulatorConfig, DEFAULT_FIT_WINDOW};
use triad_graph::Matrix;
use triad_phase::{NavigatorConfig, PhaseBands};

use crate::error::{Error, Result};

/// Everything a CLI command needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Integration step size
    pub dt: f64,
    /// Number of integration steps
    pub steps: usize,
    /// Initial node states, one row per node
    pub initial_states: Vec<Vec<f64>>,
    /// Minimum single-step improvement reported as a transition
    pub threshold: f64,
    /// Half-width of the exponent fit window
    pub window: usize,
    pub simulator: SimulatorConfig,
    pub bands: PhaseBands,
    pub navigator: NavigatorConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            steps: 50,
            initial_states: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
            threshold: 0.1,
            window: DEFAULT_FIT_WINDOW,
            simulator: SimulatorConfig::default(),
            bands: PhaseBands::default(),
            navigator: NavigatorConfig::default(),
        }
    }
}

impl CliConfig {
    /// Defaults, overlaid by `path` if given, overlaid by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env(|name| std::env::var(name).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Apply overrides from a variable lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "TRIAD_DT")? {
            self.dt = v;
        }
        if let Some(v) = parse_var(&lookup, "TRIAD_STEPS")? {
            self.steps = v;
        }
        if let Some(v) = parse_var(&lookup, "TRIAD_EPSILON")? {
            self.simulator.epsilon = v;
        }
        if let Some(v) = parse_var(&lookup, "TRIAD_WINDOW")? {
            self.window = v;
        }
        if let Some(v) = parse_var(&lookup, "TRIAD_THRESHOLD")? {
            self.threshold = v;
        }
        Ok(self)
    }

    /// The configured initial states as a matrix.
    pub fn initial_matrix(&self) -> Result<Matrix> {
        Ok(Matrix::from_rows(&self.initial_states)?)
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidEnv { name, value }),
    }
}
