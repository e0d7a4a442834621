//! Consensus graph topology and its Laplacian spectrum.
//!
//! # Spectral Facts
//!
//! For the complete graph on `N` nodes, `L = N·I − 𝟙𝟙ᵀ`, so:
//! - `λ₀ = 0` with eigenvector `𝟙/√N` (the agreement subspace)
//! - `λ₁ = … = λ_{N−1} = N` (every disagreement mode decays at the same rate)
//!
//! `λ₁ = N` is the largest algebraic connectivity any simple graph on `N`
//! nodes can have; the triad cluster therefore mixes as fast as a three-node
//! cluster can.

use crate::eigen::{symmetric_eigen, SymmetricEigen};
use crate::error::{GraphError, Result};
use crate::{Matrix, EIGEN_TOLERANCE, TRIAD_LABELS};

/// Read-only graph structure with precomputed Laplacian spectrum.
#[derive(Debug, Clone, PartialEq)]
/// Serializes for export only; rebuild through [`ConsensusGraph::from_adjacency`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConsensusGraph {
    labels: Vec<String>,
    adjacency: Matrix,
    degree: Matrix,
    laplacian: Matrix,
    spectrum: SymmetricEigen,
}

impl ConsensusGraph {
    /// Complete graph on `nodes` vertices, labelled `node-0`, `node-1`, ...
    ///
    /// ```
    /// use triad_graph::ConsensusGraph;
    ///
    /// let graph = ConsensusGraph::complete(4).unwrap();
    /// assert!((graph.algebraic_connectivity() - 4.0).abs() < 1e-9);
    /// ```
    pub fn complete(nodes: usize) -> Result<Self> {
        if nodes < 2 {
            return Err(GraphError::TooFewNodes { nodes });
        }
        let labels = (0..nodes).map(|i| format!("node-{}", i)).collect();
        Ok(Self::build(labels, complete_adjacency(nodes)))
    }

    /// The three-peer cluster `alpha`, `beta`, `gamma`.
    pub fn triad() -> Self {
        let labels = TRIAD_LABELS.iter().map(|l| l.to_string()).collect();
        Self::build(labels, complete_adjacency(TRIAD_LABELS.len()))
    }

    /// Arbitrary undirected weighted graph.
    ///
    /// The adjacency must be square, symmetric, non-negative and finite, with
    /// a zero diagonal (no self-loops).
    pub fn from_adjacency(adjacency: Matrix) -> Result<Self> {
        if !adjacency.is_square() {
            return Err(GraphError::NotSquare {
                rows: adjacency.rows(),
                cols: adjacency.cols(),
            });
        }
        let n = adjacency.rows();
        if n < 2 {
            return Err(GraphError::TooFewNodes { nodes: n });
        }
        for row in 0..n {
            for col in 0..n {
                let weight = adjacency[(row, col)];
                let bad = !weight.is_finite() || weight < 0.0 || (row == col && weight != 0.0);
                if bad {
                    return Err(GraphError::InvalidWeight { row, col, weight });
                }
            }
        }
        if let Some((row, col)) = adjacency.first_asymmetry(EIGEN_TOLERANCE) {
            return Err(GraphError::NotSymmetric { row, col });
        }
        let labels = (0..n).map(|i| format!("node-{}", i)).collect();
        Ok(Self::build(labels, adjacency))
    }

    /// Replace the node labels.
    pub fn with_labels<S: Into<String>>(mut self, labels: Vec<S>) -> Result<Self> {
        if labels.len() != self.node_count() {
            return Err(GraphError::ShapeMismatch {
                expected: self.node_count(),
                actual: labels.len(),
            });
        }
        self.labels = labels.into_iter().map(Into::into).collect();
        Ok(self)
    }

    fn build(labels: Vec<String>, adjacency: Matrix) -> Self {
        let n = adjacency.rows();
        let mut degree = Matrix::zeros(n, n);
        for i in 0..n {
            degree[(i, i)] = adjacency.row(i).iter().sum();
        }
        let laplacian = degree.scaled_add(-1.0, &adjacency);
        let spectrum = symmetric_eigen(&laplacian);
        Self {
            labels,
            adjacency,
            degree,
            laplacian,
            spectrum,
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn adjacency(&self) -> &Matrix {
        &self.adjacency
    }

    pub fn degree(&self) -> &Matrix {
        &self.degree
    }

    /// `L = D − A`.
    pub fn laplacian(&self) -> &Matrix {
        &self.laplacian
    }

    /// Laplacian eigenvalues, ascending.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.spectrum.eigenvalues
    }

    /// Column `i` pairs with `eigenvalues()[i]`.
    pub fn eigenvectors(&self) -> &Matrix {
        &self.spectrum.eigenvectors
    }

    pub fn eigenvector(&self, i: usize) -> Vec<f64> {
        self.spectrum.vector(i)
    }

    /// Second-smallest Laplacian eigenvalue `λ₁`.
    pub fn algebraic_connectivity(&self) -> f64 {
        self.spectrum.eigenvalues.get(1).copied().unwrap_or(0.0)
    }

    /// Largest Laplacian eigenvalue; bounds the explicit Euler step.
    pub fn largest_eigenvalue(&self) -> f64 {
        self.spectrum.eigenvalues.last().copied().unwrap_or(0.0)
    }

    /// `λ₁ > 0` iff the graph is connected.
    pub fn is_connected(&self) -> bool {
        self.algebraic_connectivity() > EIGEN_TOLERANCE
    }

    /// `(1/λ₁) · ln(N/ε)`: time for the diffusion to come within `epsilon`
    /// of agreement.
    ///
    /// Infinite for disconnected graphs or a non-positive `epsilon`.
    pub fn mixing_time(&self, epsilon: f64) -> f64 {
        let lambda = self.algebraic_connectivity();
        if lambda <= EIGEN_TOLERANCE || epsilon <= 0.0 {
            return f64::INFINITY;
        }
        (self.node_count() as f64 / epsilon).ln() / lambda
    }

    /// Step sizes at or above `2/λ_max` make explicit Euler diverge.
    pub fn stability_bound(&self) -> f64 {
        let lambda_max = self.largest_eigenvalue();
        if lambda_max <= EIGEN_TOLERANCE {
            return f64::INFINITY;
        }
        2.0 / lambda_max
    }

    /// `L · X` for an `N × d` state matrix.
    pub fn apply_laplacian(&self, states: &Matrix) -> Result<Matrix> {
        if states.rows() != self.node_count() {
            return Err(GraphError::ShapeMismatch {
                expected: self.node_count(),
                actual: states.rows(),
            });
        }
        Ok(self.laplacian.matmul(states))
    }
}

fn complete_adjacency(nodes: usize) -> Matrix {
    let mut adjacency = Matrix::zeros(nodes, nodes);
    for i in 0..nodes {
        for j in 0..nodes {
            if i != j {
                adjacency[(i, j)] = 1.0;
            }
        }
    }
    adjacency
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn triad_spectrum_is_zero_three_three() {
        let graph = ConsensusGraph::triad();
        let eig = graph.eigenvalues();
        assert_eq!(eig.len(), 3);
        assert_close(eig[0], 0.0);
        assert_close(eig[1], 3.0);
        assert_close(eig[2], 3.0);
    }

    #[test]
    fn triad_agreement_mode_is_all_ones() {
        let graph = ConsensusGraph::triad();
        let v = graph.eigenvector(0);
        let expected = 1.0 / 3f64.sqrt();
        for x in v {
            assert_close(x, expected);
        }
    }

    #[test]
    fn triad_connectivity_is_node_count() {
        let graph = ConsensusGraph::triad();
        assert_close(graph.algebraic_connectivity(), 3.0);
        assert!(graph.is_connected());
        assert_eq!(graph.labels(), &["alpha", "beta", "gamma"]);
    }

    #[test]
    fn laplacian_is_degree_minus_adjacency() {
        let graph = ConsensusGraph::triad();
        let expected = Matrix::from_rows(&[
            [2.0, -1.0, -1.0],
            [-1.0, 2.0, -1.0],
            [-1.0, -1.0, 2.0],
        ])
        .unwrap();
        assert_eq!(graph.laplacian(), &expected);
        for i in 0..3 {
            assert_eq!(graph.degree()[(i, i)], 2.0);
        }
    }

    #[test]
    fn apply_laplacian_checks_row_count() {
        let graph = ConsensusGraph::triad();
        let states = Matrix::from_rows(&[[1.0, 0.0], [0.0, 1.0], [-1.0, -1.0]]).unwrap();
        let flow = graph.apply_laplacian(&states).unwrap();
        assert_close(flow[(0, 0)], 3.0);
        assert_close(flow[(2, 1)], -3.0);

        let short = Matrix::zeros(2, 2);
        assert_eq!(
            graph.apply_laplacian(&short).unwrap_err(),
            GraphError::ShapeMismatch { expected: 3, actual: 2 }
        );
    }

    #[test]
    fn mixing_time_closed_form() {
        let graph = ConsensusGraph::triad();
        assert_close(graph.mixing_time(1e-3), (3.0f64 / 1e-3).ln() / 3.0);
        assert!(graph.mixing_time(0.0).is_infinite());
    }

    #[test]
    fn stability_bound_is_two_over_n() {
        assert_close(ConsensusGraph::triad().stability_bound(), 2.0 / 3.0);
    }

    #[test]
    fn complete_graph_generalizes() {
        for n in 2..=8 {
            let graph = ConsensusGraph::complete(n).unwrap();
            let eig = graph.eigenvalues();
            assert!(eig[0].abs() < 1e-9);
            for &lambda in &eig[1..] {
                assert_close(lambda, n as f64);
            }
        }
    }

    #[test]
    fn complete_rejects_single_node() {
        assert_eq!(
            ConsensusGraph::complete(1).unwrap_err(),
            GraphError::TooFewNodes { nodes: 1 }
        );
    }

    #[test]
    fn path_graph_has_lower_connectivity() {
        let path = Matrix::from_rows(&[
            [0.0, 1.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 1.0, 0.0],
        ])
        .unwrap();
        let graph = ConsensusGraph::from_adjacency(path).unwrap();
        // Path P3 Laplacian spectrum is {0, 1, 3}.
        assert_close(graph.algebraic_connectivity(), 1.0);
        assert!(graph.algebraic_connectivity() < ConsensusGraph::triad().algebraic_connectivity());
    }

    #[test]
    fn disconnected_graph_never_mixes() {
        let split = Matrix::zeros(3, 3);
        let graph = ConsensusGraph::from_adjacency(split).unwrap();
        assert!(!graph.is_connected());
        assert!(graph.mixing_time(1e-3).is_infinite());
    }

    #[test]
    fn adjacency_validation() {
        let asym = Matrix::from_rows(&[[0.0, 1.0], [0.0, 0.0]]).unwrap();
        assert_eq!(
            ConsensusGraph::from_adjacency(asym).unwrap_err(),
            GraphError::NotSymmetric { row: 0, col: 1 }
        );

        let looped = Matrix::from_rows(&[[1.0, 1.0], [1.0, 0.0]]).unwrap();
        assert!(matches!(
            ConsensusGraph::from_adjacency(looped),
            Err(GraphError::InvalidWeight { row: 0, col: 0, .. })
        ));

        let wide = Matrix::zeros(2, 3);
        assert_eq!(
            ConsensusGraph::from_adjacency(wide).unwrap_err(),
            GraphError::NotSquare { rows: 2, cols: 3 }
        );
    }

    #[test]
    fn relabel_checks_length() {
        let graph = ConsensusGraph::complete(2).unwrap();
        assert!(graph.clone().with_labels(vec!["a"]).is_err());
        let graph = graph.with_labels(vec!["left", "right"]).unwrap();
        assert_eq!(graph.labels()[1], "right");
    }
}
