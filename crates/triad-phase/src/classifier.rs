//! Regime classification and transition tracking.
//!
//! Two responsibilities, two types:
//!
//! - [`PhaseClassifier`] is a pure function of the coordinate. Calling it
//!   never changes anything.
//! - [`PhaseTracker`] owns one session's memory (current and previous
//!   regime) and turns successive observations into transition events.
//!
//! A tracker wraps a classifier; the reverse never happens.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ConfigError, Result};
use crate::params::{parameters_for, AdaptiveParameters, ParameterDelta};
use crate::{PhaseBands, PhaseRegime};

/// Stateless coordinate → regime mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseClassifier {
    bands: PhaseBands,
}

impl Default for PhaseClassifier {
    fn default() -> Self {
        Self {
            bands: PhaseBands::default(),
        }
    }
}

impl PhaseClassifier {
    /// Build a classifier over validated bands.
    pub fn new(bands: PhaseBands) -> Result<Self> {
        bands.validate()?;
        Ok(Self { bands })
    }

    pub fn bands(&self) -> &PhaseBands {
        &self.bands
    }

    /// Regime for coordinate `z`. Total over `f64`.
    pub fn classify(&self, z: f64) -> PhaseRegime {
        self.bands.classify(z)
    }

    /// Parameter bundle for `regime`.
    pub fn get_parameters(&self, regime: PhaseRegime) -> &'static AdaptiveParameters {
        parameters_for(regime)
    }

    /// Signed offset `z − z_c`.
    pub fn offset_from_critical(&self, z: f64) -> f64 {
        z - self.bands.critical
    }
}

/// Tracker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Coordinate margin a reading must clear past a boundary before the
    /// tracked regime changes. Zero means plain classification.
    pub hysteresis: f64,
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.hysteresis.is_finite() && self.hysteresis >= 0.0) {
            return Err(ConfigError::InvalidHysteresis {
                hysteresis: self.hysteresis,
            });
        }
        Ok(())
    }
}

/// A change of regime between two successive observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: PhaseRegime,
    pub to: PhaseRegime,
    pub deltas: BTreeMap<String, ParameterDelta>,
}

impl PhaseTransition {
    /// Moving toward higher coordinates.
    pub fn is_ascending(&self) -> bool {
        self.to > self.from
    }
}

/// Session-scoped regime memory.
///
/// One tracker per supervising session; it is not shared between callers.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    classifier: PhaseClassifier,
    config: TrackerConfig,
    current: Option<PhaseRegime>,
    previous: Option<PhaseRegime>,
}

impl PhaseTracker {
    pub fn new(classifier: PhaseClassifier) -> Self {
        Self::build(classifier, TrackerConfig::default())
    }

    /// Tracker with a validated `config`.
    pub fn with_config(classifier: PhaseClassifier, config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(classifier, config))
    }

    fn build(classifier: PhaseClassifier, config: TrackerConfig) -> Self {
        Self {
            classifier,
            config,
            current: None,
            previous: None,
        }
    }

    pub fn classifier(&self) -> &PhaseClassifier {
        &self.classifier
    }

    /// Regime after the latest observation.
    pub fn current(&self) -> Option<PhaseRegime> {
        self.current
    }

    /// Regime at the observation before the latest.
    pub fn previous(&self) -> Option<PhaseRegime> {
        self.previous
    }

    /// Record an observation. Returns the transition it caused, if any.
    ///
    /// The first observation establishes the regime and is never a
    /// transition.
    pub fn observe(&mut self, z: f64) -> Option<PhaseTransition> {
        let next = match self.current {
            Some(current) => self.settle(current, z),
            None => self.classifier.classify(z),
        };
        self.previous = self.current;
        self.current = Some(next);

        let transition = self.transition();
        if let Some(t) = &transition {
            info!(from = %t.from, to = %t.to, coordinate = z, "phase regime transition");
        }
        transition
    }

    /// Whether the latest observation changed the regime.
    pub fn is_transition(&self) -> bool {
        matches!((self.previous, self.current), (Some(p), Some(c)) if p != c)
    }

    /// Parameters that changed in the latest transition; empty otherwise.
    pub fn transition_delta(&self) -> BTreeMap<String, ParameterDelta> {
        match (self.previous, self.current) {
            (Some(p), Some(c)) if p != c => parameters_for(p)
                .delta(parameters_for(c))
                .into_iter()
                .map(|(name, delta)| (name.to_string(), delta))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    /// The latest transition as an event.
    pub fn transition(&self) -> Option<PhaseTransition> {
        match (self.previous, self.current) {
            (Some(from), Some(to)) if from != to => Some(PhaseTransition {
                from,
                to,
                deltas: self.transition_delta(),
            }),
            _ => None,
        }
    }

    /// Forget all observations.
    pub fn reset(&mut self) {
        self.current = None;
        self.previous = None;
    }

    /// Apply hysteresis: a move only counts once the reading clears the
    /// boundary by the configured margin.
    fn settle(&self, current: PhaseRegime, z: f64) -> PhaseRegime {
        let raw = self.classifier.classify(z);
        let h = self.config.hysteresis;
        if h <= 0.0 || raw == current {
            return raw;
        }
        if raw > current {
            self.classifier.classify(z - h).max(current)
        } else {
            self.classifier.classify(z + h).min(current)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> PhaseTracker {
        PhaseTracker::new(PhaseClassifier::default())
    }

    #[test]
    fn classify_is_pure() {
        let classifier = PhaseClassifier::default();
        let first = classifier.classify(0.867);
        let second = classifier.classify(0.867);
        assert_eq!(first, second);
        assert_eq!(first, PhaseRegime::Critical);
    }

    #[test]
    fn invalid_bands_rejected() {
        let bands = PhaseBands {
            subcritical_mid: 0.9,
            ..PhaseBands::default()
        };
        assert!(PhaseClassifier::new(bands).is_err());
    }

    #[test]
    fn first_observation_is_not_a_transition() {
        let mut t = tracker();
        assert!(t.observe(0.3).is_none());
        assert!(!t.is_transition());
        assert!(t.transition_delta().is_empty());
        assert_eq!(t.current(), Some(PhaseRegime::SubcriticalEarly));
        assert_eq!(t.previous(), None);
    }

    #[test]
    fn crossing_a_boundary_reports_deltas() {
        let mut t = tracker();
        t.observe(0.83);
        let transition = t.observe(0.86).unwrap();

        assert_eq!(transition.from, PhaseRegime::NearCritical);
        assert_eq!(transition.to, PhaseRegime::Critical);
        assert!(transition.is_ascending());
        assert!(t.is_transition());

        let delta = t.transition_delta();
        assert_eq!(delta["alert_sensitivity"], ParameterDelta { old: 0.70, new: 0.95 });
        assert_eq!(transition.deltas, delta);
    }

    #[test]
    fn staying_put_clears_transition() {
        let mut t = tracker();
        t.observe(0.83);
        t.observe(0.86);
        assert!(t.observe(0.865).is_none());
        assert!(!t.is_transition());
        assert_eq!(t.previous(), Some(PhaseRegime::Critical));
    }

    #[test]
    fn hysteresis_suppresses_boundary_chatter() {
        let config = TrackerConfig { hysteresis: 0.005 };
        let mut t = PhaseTracker::with_config(PhaseClassifier::default(), config).unwrap();
        t.observe(0.84);
        // Just over the critical lower edge (0.857) but within the margin.
        assert!(t.observe(0.859).is_none());
        assert_eq!(t.current(), Some(PhaseRegime::NearCritical));
        // Clearing the margin moves the regime.
        assert!(t.observe(0.863).is_some());
        assert_eq!(t.current(), Some(PhaseRegime::Critical));
        // Dipping just below the edge does not drop back.
        assert!(t.observe(0.855).is_none());
        assert_eq!(t.current(), Some(PhaseRegime::Critical));
        assert!(t.observe(0.85).is_some());
        assert_eq!(t.current(), Some(PhaseRegime::NearCritical));
    }

    #[test]
    fn invalid_hysteresis_rejected() {
        for hysteresis in [f64::NAN, f64::INFINITY, -0.01] {
            let config = TrackerConfig { hysteresis };
            assert!(matches!(
                PhaseTracker::with_config(PhaseClassifier::default(), config),
                Err(ConfigError::InvalidHysteresis { .. })
            ));
        }
    }

    #[test]
    fn hysteresis_still_lets_large_moves_through() {
        let config = TrackerConfig { hysteresis: 0.005 };
        let mut t = PhaseTracker::with_config(PhaseClassifier::default(), config).unwrap();
        t.observe(0.3);
        let transition = t.observe(0.97).unwrap();
        assert_eq!(transition.to, PhaseRegime::SupercriticalLate);
        t.observe(0.1);
        assert_eq!(t.current(), Some(PhaseRegime::SubcriticalEarly));
    }

    #[test]
    fn reset_forgets_history() {
        let mut t = tracker();
        t.observe(0.2);
        t.observe(0.9);
        t.reset();
        assert_eq!(t.current(), None);
        assert!(t.observe(0.95).is_none());
    }
}
