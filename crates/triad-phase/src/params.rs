//! Per-regime adaptive parameters.
//!
//! The table is static: each regime owns exactly one bundle, looked up by
//! reference and never mutated. Coupling peaks in the critical band, where
//! the cluster has to move together, and alert sensitivity peaks there too.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::PhaseRegime;

/// Configuration bundle for one regime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdaptiveParameters {
    pub coupling_strength: f64,
    /// Burden above this raises a warning
    pub burden_warning: f64,
    /// Burden above this fails the critical-band tolerance check
    pub burden_critical: f64,
    pub generation_rate: f64,
    pub alert_sensitivity: f64,
    /// Which layer gets attention first (1 = foundation)
    pub prioritized_layer: u8,
    pub primary_goal: &'static str,
    pub secondary_goal: &'static str,
}

/// One changed numeric parameter across a transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterDelta {
    pub old: f64,
    pub new: f64,
}

impl ParameterDelta {
    pub fn change(&self) -> f64 {
        self.new - self.old
    }
}

impl AdaptiveParameters {
    /// Named numeric fields, for diffing and export.
    pub fn numeric_fields(&self) -> [(&'static str, f64); 6] {
        [
            ("coupling_strength", self.coupling_strength),
            ("burden_warning", self.burden_warning),
            ("burden_critical", self.burden_critical),
            ("generation_rate", self.generation_rate),
            ("alert_sensitivity", self.alert_sensitivity),
            ("prioritized_layer", f64::from(self.prioritized_layer)),
        ]
    }

    /// Fields whose value differs between `self` (old) and `next` (new).
    pub fn delta(&self, next: &AdaptiveParameters) -> BTreeMap<&'static str, ParameterDelta> {
        self.numeric_fields()
            .iter()
            .zip(next.numeric_fields().iter())
            .filter(|((_, old), (_, new))| old != new)
            .map(|((name, old), (_, new))| (*name, ParameterDelta { old: *old, new: *new }))
            .collect()
    }
}

/// Table lookup: the parameter bundle for `regime`.
pub fn parameters_for(regime: PhaseRegime) -> &'static AdaptiveParameters {
    &TABLE[regime.ordinal()]
}

static TABLE: [AdaptiveParameters; 9] = [
    AdaptiveParameters {
        coupling_strength: 0.30,
        burden_warning: 0.60,
        burden_critical: 0.85,
        generation_rate: 0.50,
        alert_sensitivity: 0.30,
        prioritized_layer: 1,
        primary_goal: "Build foundational coordination habits",
        secondary_goal: "Record a baseline burden profile",
    },
    AdaptiveParameters {
        coupling_strength: 0.40,
        burden_warning: 0.55,
        burden_critical: 0.80,
        generation_rate: 0.60,
        alert_sensitivity: 0.40,
        prioritized_layer: 1,
        primary_goal: "Strengthen shared routines",
        secondary_goal: "Identify recurring friction",
    },
    AdaptiveParameters {
        coupling_strength: 0.50,
        burden_warning: 0.50,
        burden_critical: 0.75,
        generation_rate: 0.70,
        alert_sensitivity: 0.50,
        prioritized_layer: 2,
        primary_goal: "Consolidate routines into reusable patterns",
        secondary_goal: "Prepare for the approach to the critical band",
    },
    AdaptiveParameters {
        coupling_strength: 0.65,
        burden_warning: 0.45,
        burden_critical: 0.70,
        generation_rate: 0.80,
        alert_sensitivity: 0.70,
        prioritized_layer: 2,
        primary_goal: "Approach the critical point gradually",
        secondary_goal: "Keep burden inside tolerance",
    },
    AdaptiveParameters {
        coupling_strength: 0.80,
        burden_warning: 0.40,
        burden_critical: 0.60,
        generation_rate: 0.60,
        alert_sensitivity: 0.95,
        prioritized_layer: 3,
        primary_goal: "Hold position and stabilize the transition",
        secondary_goal: "Let the secondary layer emerge",
    },
    AdaptiveParameters {
        coupling_strength: 0.75,
        burden_warning: 0.45,
        burden_critical: 0.70,
        generation_rate: 0.90,
        alert_sensitivity: 0.80,
        prioritized_layer: 3,
        primary_goal: "Stabilize the newly emerged layer",
        secondary_goal: "Watch for regression into the critical band",
    },
    AdaptiveParameters {
        coupling_strength: 0.70,
        burden_warning: 0.50,
        burden_critical: 0.75,
        generation_rate: 1.00,
        alert_sensitivity: 0.60,
        prioritized_layer: 3,
        primary_goal: "Expand use of the emergent layer",
        secondary_goal: "Document what changed across the transition",
    },
    AdaptiveParameters {
        coupling_strength: 0.65,
        burden_warning: 0.55,
        burden_critical: 0.80,
        generation_rate: 1.10,
        alert_sensitivity: 0.50,
        prioritized_layer: 4,
        primary_goal: "Fold the emergent layer into routine operation",
        secondary_goal: "Reduce supervision overhead",
    },
    AdaptiveParameters {
        coupling_strength: 0.60,
        burden_warning: 0.60,
        burden_critical: 0.85,
        generation_rate: 1.20,
        alert_sensitivity: 0.40,
        prioritized_layer: 4,
        primary_goal: "Sustain the stable regime",
        secondary_goal: "Guide other clusters through the transition",
    },
];
