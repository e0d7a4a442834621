//! Error types for triad-consensus.

use thiserror::Error;

/// Result type for simulation runs.
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Conditions that reject a simulation run before any step is taken.
///
/// None of these touch the graph; a failed call leaves everything reusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Initial state rows must equal the graph's node count.
    #[error("initial state has {actual} rows, graph has {expected} nodes")]
    ShapeMismatch { expected: usize, actual: usize },

    /// State vectors need at least one dimension.
    #[error("initial state has zero columns")]
    EmptyState,

    /// Time steps must be positive and finite.
    #[error("step size must be positive and finite, got {dt}")]
    NonPositiveStep { dt: f64 },

    /// Explicit Euler diverges for `dt >= 2/λ_max`.
    #[error("step size {dt} violates the Euler stability bound {bound}")]
    UnstableStep { dt: f64, bound: f64 },
}
