//! Error types for triad-graph.

use thiserror::Error;

/// Result type for graph construction.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while building a graph or one of its matrices.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// A consensus graph needs at least two nodes.
    #[error("graph needs at least 2 nodes, got {nodes}")]
    TooFewNodes { nodes: usize },

    /// Adjacency matrices must be square.
    #[error("adjacency matrix is {rows}x{cols}, expected a square matrix")]
    NotSquare { rows: usize, cols: usize },

    /// Undirected graphs have symmetric adjacency.
    #[error("adjacency matrix is not symmetric at ({row}, {col})")]
    NotSymmetric { row: usize, col: usize },

    /// Edge weights must be finite and non-negative, with an empty diagonal.
    #[error("invalid edge weight {weight} at ({row}, {col})")]
    InvalidWeight { row: usize, col: usize, weight: f64 },

    /// Raw data does not match the requested shape.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}
