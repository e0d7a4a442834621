//! Error types for the triad CLI.

use thiserror::Error;

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running a command.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad command line
    #[error("Usage error: {0}")]
    Usage(String),

    /// An environment variable held an unparseable value
    #[error("Invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },

    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file or output could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Initial state did not form a matrix
    #[error("Graph error: {0}")]
    Graph(#[from] triad_graph::GraphError),

    /// Simulation rejected its inputs
    #[error("Simulation error: {0}")]
    Simulation(#[from] triad_consensus::SimulationError),

    /// Classifier or navigator configuration invalid
    #[error("Configuration error: {0}")]
    Config(#[from] triad_phase::ConfigError),
}
