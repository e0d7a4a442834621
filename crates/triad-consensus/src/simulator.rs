//! Diffusion consensus simulation with per-step metrics.
//!
//! # Dynamics
//!
//! Node states evolve under `∂X/∂t = −L·X`. Two integrators are available:
//!
//! - **Euler**: `X ← X − dt·L·X`. Each eigenmode is multiplied by
//!   `1 − λᵢ·dt` per step, so the run is stable only for `dt < 2/λ_max`
//!   (for the triad, `dt < 2/3`). The bound is enforced unless
//!   [`SimulatorConfig::enforce_stability`] is switched off.
//! - **Spectral**: `X ← U·e^{−Λ·dt}·Uᵀ·X`, the exact flow. Stable for any `dt`.
//!
//! Both preserve the node mean exactly (in exact arithmetic), since `𝟙ᵀL = 0`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use triad_graph::{ConsensusGraph, Matrix};

use crate::error::{Result, SimulationError};
use crate::estimate::{
    consensus_error, estimate_time_to_consensus, mode_energies, observed_rate,
};
use crate::DEFAULT_EPSILON;

/// Time integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// Explicit Euler on `−L·X`.
    #[default]
    Euler,
    /// Exact propagation through the eigenbasis.
    Spectral,
}

/// Configuration for the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Agreement threshold used for the time-to-consensus estimate
    pub epsilon: f64,
    /// Reject Euler steps at or beyond `2/λ_max`
    pub enforce_stability: bool,
    /// Integration scheme
    pub integrator: Integrator,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            enforce_stability: true,
            integrator: Integrator::Euler,
        }
    }
}

/// Metrics for one recorded timestep.
///
/// The node states themselves live in [`SimulationRun::trajectory`] at the
/// same index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusStep {
    /// Step index; 0 is the initial state
    pub step: usize,
    /// Simulated time `step · dt`
    pub time: f64,
    /// Per-dimension mean across nodes
    pub consensus_mean: Vec<f64>,
    /// Scalar consensus value: mean over all nodes and dimensions
    pub consensus_value: f64,
    /// RMS distance of node states from the mean
    pub consensus_error: f64,
    /// Fraction of the initial error removed
    pub mixing_progress: f64,
    /// Observed decay rate since the previous step
    pub convergence_rate: Option<f64>,
    /// Energy per Laplacian eigenmode, ascending eigenvalue order
    pub mode_energy: Vec<f64>,
    /// Closed-form time remaining to reach ε-consensus
    pub time_to_consensus: f64,
}

/// Output of a simulation run: `steps + 1` states and metrics, the first
/// entry being the initial condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub dt: f64,
    pub trajectory: Vec<Matrix>,
    pub metrics: Vec<ConsensusStep>,
}

impl SimulationRun {
    /// Node states at `step`, if recorded.
    pub fn states_at(&self, step: usize) -> Option<&Matrix> {
        self.trajectory.get(step)
    }

    pub fn final_step(&self) -> Option<&ConsensusStep> {
        self.metrics.last()
    }

    /// Consensus error per step, for the transition analyzer.
    pub fn errors(&self) -> Vec<f64> {
        self.metrics.iter().map(|m| m.consensus_error).collect()
    }
}

/// Runs diffusion consensus on a fixed graph.
///
/// Holds no per-run state; one simulator can serve any number of runs,
/// including concurrent ones.
#[derive(Debug, Clone)]
pub struct ConsensusSimulator {
    graph: ConsensusGraph,
    config: SimulatorConfig,
}

impl ConsensusSimulator {
    /// Create a simulator with default configuration.
    pub fn new(graph: ConsensusGraph) -> Self {
        Self::with_config(graph, SimulatorConfig::default())
    }

    pub fn with_config(graph: ConsensusGraph, config: SimulatorConfig) -> Self {
        Self { graph, config }
    }

    pub fn graph(&self) -> &ConsensusGraph {
        &self.graph
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Evolve `initial_states` (N × d) for `steps` steps of size `dt`.
    ///
    /// ```
    /// use triad_consensus::ConsensusSimulator;
    /// use triad_graph::{ConsensusGraph, Matrix};
    ///
    /// let sim = ConsensusSimulator::new(ConsensusGraph::triad());
    /// let x0 = Matrix::from_rows(&[[1.0, 0.0], [0.0, 1.0], [-1.0, -1.0]]).unwrap();
    /// let run = sim.run(&x0, 0.1, 50).unwrap();
    /// assert!(run.final_step().unwrap().consensus_error < 1e-3);
    /// ```
    pub fn run(&self, initial_states: &Matrix, dt: f64, steps: usize) -> Result<SimulationRun> {
        self.validate(initial_states, dt)?;

        let propagator = match self.config.integrator {
            Integrator::Euler => None,
            Integrator::Spectral => Some(self.spectral_propagator(dt)),
        };

        debug!(
            nodes = self.graph.node_count(),
            dims = initial_states.cols(),
            dt,
            steps,
            integrator = ?self.config.integrator,
            "starting consensus run"
        );

        let initial_error = consensus_error(initial_states);
        let mut trajectory = Vec::with_capacity(steps + 1);
        let mut metrics = Vec::with_capacity(steps + 1);

        let mut current = initial_states.clone();
        let mut previous_error = None;
        for step in 0..=steps {
            if step > 0 {
                current = match &propagator {
                    Some(p) => p.matmul(&current),
                    None => self.euler_step(&current, dt)?,
                };
            }
            let record = self.measure(step, dt, &current, initial_error, previous_error);
            previous_error = Some(record.consensus_error);
            metrics.push(record);
            trajectory.push(current.clone());
        }

        if let Some(last) = metrics.last() {
            debug!(
                final_error = last.consensus_error,
                mixing_progress = last.mixing_progress,
                "consensus run finished"
            );
        }

        Ok(SimulationRun {
            dt,
            trajectory,
            metrics,
        })
    }

    /// One explicit Euler step `X − dt·L·X`.
    ///
    /// Only the shape is checked; step size limits are enforced by [`run`](Self::run).
    pub fn euler_step(&self, states: &Matrix, dt: f64) -> Result<Matrix> {
        let flow = self
            .graph
            .apply_laplacian(states)
            .map_err(|_| SimulationError::ShapeMismatch {
                expected: self.graph.node_count(),
                actual: states.rows(),
            })?;
        Ok(states.scaled_add(-dt, &flow))
    }

    /// `U · diag(e^{−λᵢ·dt}) · Uᵀ`.
    pub fn spectral_propagator(&self, dt: f64) -> Matrix {
        let u = self.graph.eigenvectors();
        let mut decay = Matrix::zeros(u.cols(), u.cols());
        for (i, lambda) in self.graph.eigenvalues().iter().enumerate() {
            decay[(i, i)] = (-lambda * dt).exp();
        }
        u.matmul(&decay).matmul(&u.transpose())
    }

    fn check_rows(&self, states: &Matrix) -> Result<()> {
        let expected = self.graph.node_count();
        if states.rows() != expected {
            return Err(SimulationError::ShapeMismatch {
                expected,
                actual: states.rows(),
            });
        }
        Ok(())
    }

    fn validate(&self, initial_states: &Matrix, dt: f64) -> Result<()> {
        self.check_rows(initial_states)?;
        if initial_states.cols() == 0 {
            return Err(SimulationError::EmptyState);
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimulationError::NonPositiveStep { dt });
        }
        if self.config.integrator == Integrator::Euler {
            let bound = self.graph.stability_bound();
            if dt >= bound {
                if self.config.enforce_stability {
                    return Err(SimulationError::UnstableStep { dt, bound });
                }
                warn!(dt, bound, "Euler step beyond stability bound, run will diverge");
            }
        }
        Ok(())
    }

    fn measure(
        &self,
        step: usize,
        dt: f64,
        states: &Matrix,
        initial_error: f64,
        previous_error: Option<f64>,
    ) -> ConsensusStep {
        let consensus_mean = states.column_means();
        let consensus_value = if consensus_mean.is_empty() {
            0.0
        } else {
            consensus_mean.iter().sum::<f64>() / consensus_mean.len() as f64
        };
        let error = consensus_error(states);
        // Zero initial error: already converged, nothing left to mix.
        let mixing_progress = if initial_error > 0.0 {
            1.0 - error / initial_error
        } else {
            1.0
        };

        ConsensusStep {
            step,
            time: step as f64 * dt,
            consensus_mean,
            consensus_value,
            consensus_error: error,
            mixing_progress,
            convergence_rate: previous_error.and_then(|prev| observed_rate(prev, error, dt)),
            mode_energy: mode_energies(&self.graph, states),
            time_to_consensus: estimate_time_to_consensus(
                error,
                self.config.epsilon,
                self.graph.algebraic_connectivity(),
            ),
        }
    }
}
