//! Closed-form consensus quantities.
//!
//! These are the analytic counterparts of the simulator: state measurements
//! (error, eigenmode energy) and the exponential-decay predictions derived
//! from the Laplacian spectrum. They are kept free of the integration loop so
//! the predictions can be checked against simulated trajectories.

use triad_graph::{ConsensusGraph, Matrix};

/// RMS distance of node states from their mean:
/// `sqrt( (1/N) Σᵢ ‖xᵢ − x̄‖² )`.
pub fn consensus_error(states: &Matrix) -> f64 {
    let n = states.rows();
    if n == 0 {
        return 0.0;
    }
    let mean = states.column_means();
    let mut sum = 0.0;
    for r in 0..n {
        for (x, m) in states.row(r).iter().zip(&mean) {
            sum += (x - m) * (x - m);
        }
    }
    (sum / n as f64).sqrt()
}

/// Subtract the node mean from every row.
pub fn centered(states: &Matrix) -> Matrix {
    let mean = states.column_means();
    let mut out = states.clone();
    for r in 0..states.rows() {
        for (c, m) in mean.iter().enumerate() {
            out[(r, c)] -= m;
        }
    }
    out
}

/// Squared norm of the projection of the centred state onto each Laplacian
/// eigenvector, in eigenvalue order.
///
/// Mode `i` carries `‖uᵢᵀ X_c‖²`. The zero mode of a centred state is always
/// empty; every other mode decays as `e^{−2λᵢt}` under exact diffusion.
pub fn mode_energies(graph: &ConsensusGraph, states: &Matrix) -> Vec<f64> {
    let projections = graph.eigenvectors().transpose().matmul(&centered(states));
    (0..projections.rows())
        .map(|i| projections.row(i).iter().map(|p| p * p).sum())
        .collect()
}

/// `error₀ · e^{−λt}`.
pub fn predicted_error(error0: f64, lambda: f64, t: f64) -> f64 {
    error0 * (-lambda * t).exp()
}

/// Time until `error` decays to `epsilon` at rate `lambda`:
/// `t = −ln(ε/error)/λ`, clamped to `≥ 0`.
///
/// An already-converged error (including exactly zero) needs no time. A
/// non-positive rate or target can never be reached.
pub fn estimate_time_to_consensus(error: f64, epsilon: f64, lambda: f64) -> f64 {
    if error <= 0.0 || error <= epsilon {
        return 0.0;
    }
    if lambda <= 0.0 || epsilon <= 0.0 {
        return f64::INFINITY;
    }
    (-(epsilon / error).ln() / lambda).max(0.0)
}

/// Per-step decay rate observed between two successive errors.
///
/// `None` if either error is zero (nothing left to measure).
pub fn observed_rate(previous: f64, current: f64, dt: f64) -> Option<f64> {
    if previous <= 0.0 || current <= 0.0 || dt <= 0.0 {
        return None;
    }
    Some((previous / current).ln() / dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states() -> Matrix {
        Matrix::from_rows(&[[1.0, 0.0], [0.0, 1.0], [-1.0, -1.0]]).unwrap()
    }

    #[test]
    fn error_of_agreement_is_zero() {
        let agreed = Matrix::from_rows(&[[2.0, 5.0], [2.0, 5.0], [2.0, 5.0]]).unwrap();
        assert_eq!(consensus_error(&agreed), 0.0);
    }

    #[test]
    fn error_matches_hand_computation() {
        // Mean is [0, 0]; squared norms are 1, 1, 2 → sqrt(4/3).
        let expected = (4.0f64 / 3.0).sqrt();
        assert!((consensus_error(&states()) - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_mode_of_centered_state_is_empty() {
        let graph = ConsensusGraph::triad();
        let energies = mode_energies(&graph, &states());
        assert_eq!(energies.len(), 3);
        assert!(energies[0].abs() < 1e-12);
        // Energy is preserved by the orthonormal basis: Σ = N·error².
        let total: f64 = energies.iter().sum();
        assert!((total - 3.0 * consensus_error(&states()).powi(2)).abs() < 1e-9);
    }

    #[test]
    fn time_to_consensus_clamps() {
        assert_eq!(estimate_time_to_consensus(0.0, 1e-3, 3.0), 0.0);
        assert_eq!(estimate_time_to_consensus(1e-4, 1e-3, 3.0), 0.0);
        assert!(estimate_time_to_consensus(1.0, 1e-3, 0.0).is_infinite());

        let t = estimate_time_to_consensus(1.0, 1e-3, 3.0);
        assert!((predicted_error(1.0, 3.0, t) - 1e-3).abs() < 1e-12);
    }

    #[test]
    fn observed_rate_recovers_lambda() {
        let dt = 0.05;
        let rate = observed_rate(1.0, predicted_error(1.0, 3.0, dt), dt).unwrap();
        assert!((rate - 3.0).abs() < 1e-12);
        assert_eq!(observed_rate(0.0, 0.0, dt), None);
    }
}
