//! Critical-point supervision with rollback.
//!
//! The navigator is polled with a coordinate and an external burden reading.
//! Away from the critical band it only reports where the cluster stands.
//! Inside the band it also runs named safety checks and counts consecutive
//! burden spikes; a long enough streak, or a majority of failing checks,
//! recommends rolling back.
//!
//! # Instability Counter
//!
//! - In the critical band, burden above the spike threshold: `count += 1`
//! - In the critical band, burden at or below it: `count = 0`
//! - Outside the critical band: `count = 0`
//!
//! A single calm reading therefore restarts the streak, and a single spike
//! never triggers rollback on its own unless the duration is 1.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::{PhaseClassifier, PhaseTracker, TrackerConfig};
use crate::error::{ConfigError, Result};
use crate::params::parameters_for;
use crate::PhaseRegime;

/// Safety check: burden at or below the regime's critical threshold.
pub const CHECK_BURDEN: &str = "burden_within_tolerance";
/// Safety check: instability streak shorter than the configured duration.
pub const CHECK_INSTABILITY: &str = "no_prolonged_instability";
/// Safety check: coordinate at or past the critical value.
pub const CHECK_SECONDARY_LAYER: &str = "secondary_layer_emerging";
/// Safety check: coordinate moved no more than the allowed step.
pub const CHECK_STEADY: &str = "coordinate_steady";

/// Estimated time to carry out a rollback plan.
const ROLLBACK_ESTIMATE: Duration = Duration::from_secs(15 * 60);

/// Coarse status of a navigation reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTier {
    Safe,
    Nominal,
    Caution,
    Critical,
}

impl StatusTier {
    /// Fixed status per regime.
    pub const fn for_regime(regime: PhaseRegime) -> Self {
        match regime {
            PhaseRegime::SubcriticalEarly | PhaseRegime::SubcriticalMid => StatusTier::Safe,
            PhaseRegime::SubcriticalLate => StatusTier::Nominal,
            PhaseRegime::NearCritical => StatusTier::Caution,
            PhaseRegime::Critical => StatusTier::Critical,
            PhaseRegime::SupercriticalEarly => StatusTier::Caution,
            PhaseRegime::SupercriticalMid | PhaseRegime::SupercriticalLate => StatusTier::Nominal,
            PhaseRegime::SupercriticalStable => StatusTier::Safe,
        }
    }
}

/// Navigator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Burden above this counts as a spike inside the critical band
    pub spike_threshold: f64,
    /// Consecutive spikes that force a rollback recommendation
    pub instability_duration: u32,
    /// Guidance entries kept before the oldest is dropped
    pub history_capacity: usize,
    /// Largest coordinate move per observation that still counts as steady
    pub max_coordinate_step: f64,
    /// Hysteresis passed to the regime tracker
    pub tracker: TrackerConfig,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            spike_threshold: 0.7,
            instability_duration: 3,
            history_capacity: 100,
            max_coordinate_step: 0.02,
            tracker: TrackerConfig::default(),
        }
    }
}

impl NavigatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.instability_duration == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        for (name, value) in [
            ("spike_threshold", self.spike_threshold),
            ("max_coordinate_step", self.max_coordinate_step),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        self.tracker.validate()
    }
}

/// Result of one navigation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationGuidance {
    pub coordinate: f64,
    pub burden: f64,
    pub regime: PhaseRegime,
    /// `|z − z_c|`
    pub distance_to_critical: f64,
    pub status: StatusTier,
    pub primary_action: String,
    pub warnings: Vec<String>,
    pub exercises: Vec<String>,
    /// Named checks; populated only inside the critical band
    pub safety_checks: BTreeMap<String, bool>,
    /// Spike streak after this observation
    pub instability_count: u32,
}

impl NavigationGuidance {
    /// Names of checks that did not pass.
    pub fn failing_checks(&self) -> Vec<&str> {
        self.safety_checks
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Whether to roll back, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackDecision {
    pub rollback: bool,
    pub reason: String,
}

/// Remediation sequence for sustained instability in the critical band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackPlan {
    pub steps: Vec<String>,
    pub rationale: String,
    pub estimated_duration_secs: u64,
}

impl RollbackPlan {
    pub fn estimated_duration(&self) -> Duration {
        Duration::from_secs(self.estimated_duration_secs)
    }
}

/// Supervisory state machine around the critical band.
///
/// Owned by one session. Calls mutate the instability counter and history, so
/// a navigator shared between callers needs external locking.
#[derive(Debug, Clone)]
pub struct CriticalPointNavigator {
    tracker: PhaseTracker,
    config: NavigatorConfig,
    instability_count: u32,
    last_coordinate: Option<f64>,
    history: VecDeque<NavigationGuidance>,
}

impl Default for CriticalPointNavigator {
    fn default() -> Self {
        Self::build(PhaseTracker::new(PhaseClassifier::default()), NavigatorConfig::default())
    }
}

impl CriticalPointNavigator {
    /// Create a navigator over `classifier` with a validated `config`.
    pub fn new(classifier: PhaseClassifier, config: NavigatorConfig) -> Result<Self> {
        config.validate()?;
        let tracker = PhaseTracker::with_config(classifier, config.tracker)?;
        Ok(Self::build(tracker, config))
    }

    fn build(tracker: PhaseTracker, config: NavigatorConfig) -> Self {
        Self {
            tracker,
            instability_count: 0,
            last_coordinate: None,
            history: VecDeque::with_capacity(config.history_capacity.min(1024)),
            config,
        }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn tracker(&self) -> &PhaseTracker {
        &self.tracker
    }

    pub fn instability_count(&self) -> u32 {
        self.instability_count
    }

    /// Guidance so far, oldest first.
    pub fn history(&self) -> &VecDeque<NavigationGuidance> {
        &self.history
    }

    pub fn last_guidance(&self) -> Option<&NavigationGuidance> {
        self.history.back()
    }

    /// Return to the initial state: no regime, counter zero, empty history.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.instability_count = 0;
        self.last_coordinate = None;
        self.history.clear();
    }

    /// Classify the reading, update instability bookkeeping and produce
    /// guidance. Never fails: every coordinate and burden gets an answer.
    pub fn navigate(&mut self, coordinate: f64, burden: f64) -> NavigationGuidance {
        let transition = self.tracker.observe(coordinate);
        let regime = self
            .tracker
            .current()
            .unwrap_or_else(|| self.tracker.classifier().classify(coordinate));
        let params = parameters_for(regime);
        let in_critical = regime == PhaseRegime::Critical;

        if in_critical && burden > self.config.spike_threshold {
            self.instability_count = self.instability_count.saturating_add(1);
        } else {
            self.instability_count = 0;
        }

        let jump = self
            .last_coordinate
            .map(|last| (coordinate - last).abs())
            .filter(|d| d.is_finite());

        let mut warnings = Vec::new();
        if let Some(t) = &transition {
            warnings.push(format!("Regime changed from {} to {}", t.from, t.to));
        }
        if burden > params.burden_critical {
            warnings.push(format!(
                "Burden {:.2} exceeds critical threshold {:.2}",
                burden, params.burden_critical
            ));
        } else if burden > params.burden_warning {
            warnings.push(format!(
                "Burden {:.2} above warning threshold {:.2}",
                burden, params.burden_warning
            ));
        }
        if self.instability_count > 0 {
            warnings.push(format!(
                "Instability sustained for {} of {} allowed observations",
                self.instability_count, self.config.instability_duration
            ));
        }
        if let Some(d) = jump.filter(|d| *d > self.config.max_coordinate_step) {
            warnings.push(format!("Coordinate moved {:.3} in one observation", d));
        }

        let mut safety_checks = BTreeMap::new();
        if in_critical {
            let critical = self.tracker.classifier().bands().critical;
            safety_checks.insert(CHECK_BURDEN.to_string(), burden <= params.burden_critical);
            safety_checks.insert(
                CHECK_INSTABILITY.to_string(),
                self.instability_count < self.config.instability_duration,
            );
            safety_checks.insert(CHECK_SECONDARY_LAYER.to_string(), coordinate >= critical);
            safety_checks.insert(
                CHECK_STEADY.to_string(),
                jump.map_or(true, |d| d <= self.config.max_coordinate_step),
            );
        }

        let guidance = NavigationGuidance {
            coordinate,
            burden,
            regime,
            distance_to_critical: (coordinate - self.tracker.classifier().bands().critical).abs(),
            status: StatusTier::for_regime(regime),
            primary_action: primary_action(regime).to_string(),
            warnings,
            exercises: exercises(regime).iter().map(|e| e.to_string()).collect(),
            safety_checks,
            instability_count: self.instability_count,
        };

        debug!(
            coordinate,
            burden,
            regime = %regime,
            instability = self.instability_count,
            "navigation reading"
        );

        if coordinate.is_finite() {
            self.last_coordinate = Some(coordinate);
        }
        if self.history.len() == self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(guidance.clone());
        guidance
    }

    /// Decide on rollback from a guidance record and the instability streak
    /// it carries.
    ///
    /// Only the critical band can roll back. Within it, rollback is due when
    /// the streak reaches the configured duration or more than half of the
    /// safety checks fail.
    pub fn should_rollback(&self, guidance: &NavigationGuidance) -> RollbackDecision {
        if guidance.regime != PhaseRegime::Critical {
            return RollbackDecision {
                rollback: false,
                reason: format!("Regime {} is outside the critical band", guidance.regime),
            };
        }

        let duration = self.config.instability_duration;
        let count = guidance.instability_count;
        if count >= duration {
            let reason = format!(
                "Instability sustained for {} consecutive observations (limit {})",
                count, duration
            );
            warn!(count, "rollback recommended: {}", reason);
            return RollbackDecision {
                rollback: true,
                reason,
            };
        }

        let failing = guidance.failing_checks();
        let total = guidance.safety_checks.len();
        if failing.len() * 2 > total {
            let reason = format!(
                "{} of {} safety checks failing: {}",
                failing.len(),
                total,
                failing.join(", ")
            );
            warn!(failing = failing.len(), total, "rollback recommended: {}", reason);
            return RollbackDecision {
                rollback: true,
                reason,
            };
        }

        RollbackDecision {
            rollback: false,
            reason: format!(
                "Within safety envelope ({} of {} checks failing)",
                failing.len(),
                total
            ),
        }
    }

    /// The fixed remediation sequence, parameterised by the current bands.
    pub fn rollback_plan(&self) -> RollbackPlan {
        let bands = self.tracker.classifier().bands();
        RollbackPlan {
            steps: vec![
                format!(
                    "Reduce the target coordinate into the near-critical band [{:.3}, {:.3})",
                    bands.near_critical,
                    bands.critical_lower()
                ),
                "Stabilize the secondary layer before pushing further".to_string(),
                format!(
                    "Reduce burden pressure below the spike threshold {:.2}",
                    self.config.spike_threshold
                ),
                format!(
                    "Wait for the coordinate to re-stabilize below {:.3}",
                    bands.critical_lower()
                ),
                format!(
                    "Retry the transition more gradually, at most {:.3} per observation",
                    self.config.max_coordinate_step / 2.0
                ),
            ],
            rationale: "Sustained instability inside the critical band means the transition \
                        is being pushed faster than the cluster can absorb it. Retreating to \
                        the near-critical band restores a stable regime from which the \
                        approach can be retried in smaller steps."
                .to_string(),
            estimated_duration_secs: ROLLBACK_ESTIMATE.as_secs(),
        }
    }
}

fn primary_action(regime: PhaseRegime) -> &'static str {
    match regime {
        PhaseRegime::SubcriticalEarly => "Establish baseline coordination; no transition pressure",
        PhaseRegime::SubcriticalMid => "Build shared routines and keep burden low",
        PhaseRegime::SubcriticalLate => "Consolidate patterns; begin monitoring burden closely",
        PhaseRegime::NearCritical => "Approach slowly; verify burden margin before each step",
        PhaseRegime::Critical => "Hold position and monitor every safety check",
        PhaseRegime::SupercriticalEarly => "Stabilize the emerged layer; guard against regression",
        PhaseRegime::SupercriticalMid => "Expand use of the emerged layer",
        PhaseRegime::SupercriticalLate => "Fold the emerged layer into routine operation",
        PhaseRegime::SupercriticalStable => "Maintain the stable regime",
    }
}

fn exercises(regime: PhaseRegime) -> &'static [&'static str] {
    match regime {
        PhaseRegime::SubcriticalEarly | PhaseRegime::SubcriticalMid => &[
            "Log burden once per cycle",
            "Agree on one shared routine",
        ],
        PhaseRegime::SubcriticalLate => &[
            "Review recurring friction points",
            "Turn one routine into a reusable pattern",
        ],
        PhaseRegime::NearCritical => &[
            "Rehearse the rollback plan",
            "Check burden margin against the critical threshold",
            "Reduce step size toward the critical point",
        ],
        PhaseRegime::Critical => &[
            "Pause new work until checks pass",
            "Confirm each peer observes the same coordinate",
            "Record every burden spike",
        ],
        PhaseRegime::SupercriticalEarly => &[
            "Verify the emerged layer under light load",
            "Compare burden against the pre-transition baseline",
        ],
        PhaseRegime::SupercriticalMid | PhaseRegime::SupercriticalLate => &[
            "Document what changed across the transition",
            "Relax supervision one step at a time",
        ],
        PhaseRegime::SupercriticalStable => &["Share the transition record with other clusters"],
    }
}
