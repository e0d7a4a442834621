//! Triad Consensus Graph
//!
//! Fixed small-N topologies for simulated consensus, with the graph Laplacian
//! and its spectrum precomputed at construction.
//!
//! # Mathematical Foundation
//!
//! Consensus by diffusion follows `∂X/∂t = −L·X` with `L = D − A`. Expanding
//! `X` in the Laplacian eigenbasis decouples the dynamics: the component along
//! eigenvector `uᵢ` decays as `e^{−λᵢ t}`. The zero eigenvalue's eigenvector is
//! the all-ones direction, so the node average never moves, and the
//! second-smallest eigenvalue `λ₁` (algebraic connectivity) sets the
//! slowest, and therefore dominant, rate of agreement.
//!
//! # The Triad
//!
//! The canonical cluster is three peers on a complete graph. Its spectrum is
//! exactly `{0, 3, 3}`, which is what the regression tests pin down.

mod eigen;
mod error;
mod graph;
mod matrix;

pub use eigen::{symmetric_eigen, SymmetricEigen};
pub use error::{GraphError, Result};
pub use graph::ConsensusGraph;
pub use matrix::Matrix;

/// Number of peers in the canonical cluster.
pub const TRIAD_NODES: usize = 3;

/// Labels of the canonical cluster, in graph order.
pub const TRIAD_LABELS: [&str; TRIAD_NODES] = ["alpha", "beta", "gamma"];

/// Tolerance for treating an eigenvalue as zero.
pub const EIGEN_TOLERANCE: f64 = 1e-9;

// Compile-time assertion that the canonical cluster can run consensus
const _: () = assert!(TRIAD_NODES >= 2);
