//! Diffusion Consensus
//!
//! Nodes in a triad don't vote and don't elect a leader. Each one repeatedly
//! moves its state toward its neighbours', and the cluster **converges** to
//! the average of where it started.
//!
//! # Core Insight
//!
//! Agreement is a decay process. Decompose the disagreement along the graph
//! Laplacian's eigenvectors and every component shrinks independently at
//! `e^{−λᵢt}`. The slowest nonzero rate `λ₁` sets how long consensus takes,
//! which yields a closed-form time-to-agreement that the simulation can be
//! checked against.
//!
//! # Pieces
//!
//! - [`ConsensusSimulator`] integrates `∂X/∂t = −L·X` and records a
//!   [`ConsensusStep`] per step
//! - [`estimate`] holds the closed-form counterparts
//! - [`TransitionAnalyzer`] looks for sharp changes and power-law behaviour
//!   in a finished run

mod error;
pub mod estimate;
mod simulator;
mod transition;

pub use error::{Result, SimulationError};
pub use estimate::{consensus_error, estimate_time_to_consensus, mode_energies, predicted_error};
pub use simulator::{ConsensusSimulator, ConsensusStep, Integrator, SimulationRun, SimulatorConfig};
pub use transition::{errors_of, ExponentFit, TransitionAnalyzer, TransitionReport};

/// Default ε for "close enough to agreement".
pub const DEFAULT_EPSILON: f64 = 1e-3;

/// Default half-width, in steps, of the critical exponent fit window.
pub const DEFAULT_FIT_WINDOW: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;
    use triad_graph::{ConsensusGraph, Matrix};

    #[test]
    fn analyzer_consumes_simulator_output() {
        let sim = ConsensusSimulator::new(ConsensusGraph::triad());
        let x0 = Matrix::from_rows(&[[1.0, 0.0], [0.0, 1.0], [-1.0, -1.0]]).unwrap();
        let run = sim.run(&x0, 0.1, 50).unwrap();

        let analyzer = TransitionAnalyzer::default();
        let from_states = analyzer.detect_phase_transition(&run.trajectory, 0.1);
        let from_errors = analyzer.detect_in_errors(&run.errors(), 0.1);
        assert_eq!(from_states, from_errors);

        // Geometric decay: the first step removes the most error.
        assert!(matches!(from_states, TransitionReport::Detected { step: 1, .. }));
        assert!(analyzer.fit_critical_exponent(&run.trajectory).exponent().is_some());
    }
}
