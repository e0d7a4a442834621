//! Phase Regimes and Critical-Point Navigation
//!
//! A scalar control coordinate drives the cluster through nine ordered
//! regimes, from subcritical through a narrow critical band to a stable
//! supercritical regime. This crate classifies coordinates, tracks regime
//! changes for a session, and supervises the critical band.
//!
//! # Layers
//!
//! 1. [`PhaseBands`] / [`PhaseClassifier`]: pure, total classification
//! 2. [`parameters_for`]: static per-regime [`AdaptiveParameters`]
//! 3. [`PhaseTracker`]: current/previous regime and transition deltas
//! 4. [`CriticalPointNavigator`]: safety checks, instability streaks, and
//!    rollback recommendations inside the critical band
//!
//! Nothing here blocks or performs I/O. Trackers and navigators hold session
//! state and belong to exactly one caller.

mod classifier;
mod error;
mod navigator;
mod params;
mod regime;

pub use classifier::{PhaseClassifier, PhaseTracker, PhaseTransition, TrackerConfig};
pub use error::{ConfigError, Result};
pub use navigator::{
    CriticalPointNavigator, NavigationGuidance, NavigatorConfig, RollbackDecision, RollbackPlan,
    StatusTier, CHECK_BURDEN, CHECK_INSTABILITY, CHECK_SECONDARY_LAYER, CHECK_STEADY,
};
pub use params::{parameters_for, AdaptiveParameters, ParameterDelta};
pub use regime::{PhaseBands, PhaseRegime};
