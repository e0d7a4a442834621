//! Error types for triad-phase.

use thiserror::Error;

/// Result type for configuration checks.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Invalid classifier or navigator configuration.
///
/// Only construction can fail; once built, classification and navigation
/// accept any input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Band boundaries must be strictly ascending.
    #[error("band boundary {lower} is not below {upper}")]
    UnorderedBands { lower: f64, upper: f64 },

    /// The critical band needs a positive, finite half-width.
    #[error("critical half-width must be positive and finite, got {width}")]
    NonPositiveWidth { width: f64 },

    /// Hysteresis margins must be finite and non-negative.
    #[error("hysteresis must be finite and non-negative, got {hysteresis}")]
    InvalidHysteresis { hysteresis: f64 },

    /// Navigator thresholds must be finite and non-negative.
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    /// Rollback needs at least one unstable observation to trigger.
    #[error("instability duration must be at least 1")]
    ZeroDuration,

    /// Guidance history must hold at least the latest entry.
    #[error("history capacity must be at least 1")]
    ZeroHistory,
}
