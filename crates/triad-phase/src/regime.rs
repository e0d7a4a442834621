//! Phase regimes and the coordinate bands that define them.
//!
//! # Bands
//!
//! Nine consecutive, non-overlapping bands cover the whole real line. Each
//! band includes its lower bound and excludes its upper bound, so a
//! coordinate sitting exactly on a boundary belongs to the higher regime.
//!
//! ```text
//! SubcriticalEarly    (−∞,        mid)
//! SubcriticalMid      [mid,       late)
//! SubcriticalLate     [late,      near)
//! NearCritical        [near,      z_c − w)
//! Critical            [z_c − w,   z_c + w)
//! SupercriticalEarly  [z_c + w,   s_mid)
//! SupercriticalMid    [s_mid,     s_late)
//! SupercriticalLate   [s_late,    stable)
//! SupercriticalStable [stable,    +∞)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Discrete regime label, ordered by increasing coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseRegime {
    SubcriticalEarly,
    SubcriticalMid,
    SubcriticalLate,
    NearCritical,
    Critical,
    SupercriticalEarly,
    SupercriticalMid,
    SupercriticalLate,
    SupercriticalStable,
}

impl PhaseRegime {
    /// Every regime in ascending order.
    pub const ALL: [PhaseRegime; 9] = [
        PhaseRegime::SubcriticalEarly,
        PhaseRegime::SubcriticalMid,
        PhaseRegime::SubcriticalLate,
        PhaseRegime::NearCritical,
        PhaseRegime::Critical,
        PhaseRegime::SupercriticalEarly,
        PhaseRegime::SupercriticalMid,
        PhaseRegime::SupercriticalLate,
        PhaseRegime::SupercriticalStable,
    ];

    /// Position in [`PhaseRegime::ALL`].
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PhaseRegime::SubcriticalEarly => "subcritical_early",
            PhaseRegime::SubcriticalMid => "subcritical_mid",
            PhaseRegime::SubcriticalLate => "subcritical_late",
            PhaseRegime::NearCritical => "near_critical",
            PhaseRegime::Critical => "critical",
            PhaseRegime::SupercriticalEarly => "supercritical_early",
            PhaseRegime::SupercriticalMid => "supercritical_mid",
            PhaseRegime::SupercriticalLate => "supercritical_late",
            PhaseRegime::SupercriticalStable => "supercritical_stable",
        }
    }

    pub const fn is_subcritical(self) -> bool {
        matches!(
            self,
            PhaseRegime::SubcriticalEarly | PhaseRegime::SubcriticalMid | PhaseRegime::SubcriticalLate
        )
    }

    pub const fn is_supercritical(self) -> bool {
        matches!(
            self,
            PhaseRegime::SupercriticalEarly
                | PhaseRegime::SupercriticalMid
                | PhaseRegime::SupercriticalLate
                | PhaseRegime::SupercriticalStable
        )
    }
}

impl fmt::Display for PhaseRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band boundaries on the control coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseBands {
    /// Lower bound of SubcriticalMid
    pub subcritical_mid: f64,
    /// Lower bound of SubcriticalLate
    pub subcritical_late: f64,
    /// Lower bound of NearCritical
    pub near_critical: f64,
    /// Critical coordinate `z_c`
    pub critical: f64,
    /// Half-width `w` of the critical band
    pub critical_half_width: f64,
    /// Lower bound of SupercriticalMid
    pub supercritical_mid: f64,
    /// Lower bound of SupercriticalLate
    pub supercritical_late: f64,
    /// Lower bound of SupercriticalStable
    pub supercritical_stable: f64,
}

impl Default for PhaseBands {
    fn default() -> Self {
        Self {
            subcritical_mid: 0.50,
            subcritical_late: 0.65,
            near_critical: 0.80,
            critical: 0.867,
            critical_half_width: 0.01,
            supercritical_mid: 0.90,
            supercritical_late: 0.95,
            supercritical_stable: 1.00,
        }
    }
}

impl PhaseBands {
    /// Lower edge of the critical band, `z_c − w`.
    pub fn critical_lower(&self) -> f64 {
        self.critical - self.critical_half_width
    }

    /// Upper edge of the critical band, `z_c + w` (exclusive).
    pub fn critical_upper(&self) -> f64 {
        self.critical + self.critical_half_width
    }

    /// The eight interior boundaries, ascending.
    pub fn boundaries(&self) -> [f64; 8] {
        [
            self.subcritical_mid,
            self.subcritical_late,
            self.near_critical,
            self.critical_lower(),
            self.critical_upper(),
            self.supercritical_mid,
            self.supercritical_late,
            self.supercritical_stable,
        ]
    }

    /// Check that every band is non-empty.
    pub fn validate(&self) -> Result<()> {
        let width = self.critical_half_width;
        if !(width.is_finite() && width > 0.0) {
            return Err(ConfigError::NonPositiveWidth { width });
        }
        for pair in self.boundaries().windows(2) {
            // `!(a < b)` also rejects NaN boundaries.
            if !(pair[0] < pair[1]) {
                return Err(ConfigError::UnorderedBands {
                    lower: pair[0],
                    upper: pair[1],
                });
            }
        }
        Ok(())
    }

    /// `[lower, upper)` of a regime's band; the outer bands are unbounded.
    pub fn band(&self, regime: PhaseRegime) -> (f64, f64) {
        let b = self.boundaries();
        let i = regime.ordinal();
        let lower = if i == 0 { f64::NEG_INFINITY } else { b[i - 1] };
        let upper = if i == b.len() { f64::INFINITY } else { b[i] };
        (lower, upper)
    }

    /// Map a coordinate to its regime. Total: NaN lands in the lowest regime.
    pub fn classify(&self, z: f64) -> PhaseRegime {
        self.boundaries()
            .iter()
            .rposition(|&bound| z >= bound)
            .map(|i| PhaseRegime::ALL[i + 1])
            .unwrap_or(PhaseRegime::SubcriticalEarly)
    }
}
