//! Post-hoc analysis of consensus error sequences.
//!
//! Two questions get asked of a finished run:
//!
//! 1. Did the error ever drop sharply in a single step (a transition)?
//! 2. Near the steepest change, does the error follow a power law
//!    `error ∝ |t − t_c|^β`, and what is `β`?
//!
//! Short histories are an expected warm-up condition, so both answers come
//! back as values with an explicit insufficient-data case rather than errors.

use serde::{Deserialize, Serialize};
use tracing::debug;
use triad_graph::Matrix;

use crate::estimate::consensus_error;
use crate::DEFAULT_FIT_WINDOW;

/// Minimum errors needed to take a first difference.
const MIN_TRANSITION_POINTS: usize = 2;

/// Minimum errors needed to attempt an exponent fit.
const MIN_FIT_POINTS: usize = 3;

/// Outcome of transition detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionReport {
    /// The largest single-step improvement exceeded the threshold.
    Detected {
        /// Index of the step that ended the improvement
        step: usize,
        improvement: f64,
        error_before: f64,
        error_after: f64,
    },
    /// No step improved by more than the threshold.
    NotDetected { largest_improvement: f64 },
    /// Too few observations to difference.
    InsufficientData { required: usize, available: usize },
}

impl TransitionReport {
    pub fn is_detected(&self) -> bool {
        matches!(self, TransitionReport::Detected { .. })
    }
}

/// Outcome of the critical exponent fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExponentFit {
    /// Log–log least squares around the steepest change.
    Fitted {
        /// Index of the steepest error derivative
        critical_index: usize,
        /// Fitted slope, the estimated critical exponent
        exponent: f64,
        intercept: f64,
        r_squared: f64,
        /// Number of points used in the fit
        points: usize,
    },
    /// Not enough usable observations.
    InsufficientData { required: usize, available: usize },
}

impl ExponentFit {
    pub fn exponent(&self) -> Option<f64> {
        match self {
            ExponentFit::Fitted { exponent, .. } => Some(*exponent),
            ExponentFit::InsufficientData { .. } => None,
        }
    }
}

/// Statistical analysis over consensus error histories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionAnalyzer {
    /// Half-width of the fit window, in steps
    pub window: usize,
}

impl Default for TransitionAnalyzer {
    fn default() -> Self {
        Self {
            window: DEFAULT_FIT_WINDOW,
        }
    }
}

impl TransitionAnalyzer {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// Report the step of maximal single-step error improvement, if it beats
    /// `threshold`.
    pub fn detect_phase_transition(&self, states: &[Matrix], threshold: f64) -> TransitionReport {
        self.detect_in_errors(&errors_of(states), threshold)
    }

    /// [`detect_phase_transition`](Self::detect_phase_transition) over a
    /// precomputed error series.
    pub fn detect_in_errors(&self, errors: &[f64], threshold: f64) -> TransitionReport {
        if errors.len() < MIN_TRANSITION_POINTS {
            return TransitionReport::InsufficientData {
                required: MIN_TRANSITION_POINTS,
                available: errors.len(),
            };
        }

        let mut best_step = 1;
        let mut best = f64::NEG_INFINITY;
        for (i, w) in errors.windows(2).enumerate() {
            let improvement = w[0] - w[1];
            if improvement > best {
                best = improvement;
                best_step = i + 1;
            }
        }

        if best > threshold {
            debug!(step = best_step, improvement = best, "transition detected");
            TransitionReport::Detected {
                step: best_step,
                improvement: best,
                error_before: errors[best_step - 1],
                error_after: errors[best_step],
            }
        } else {
            TransitionReport::NotDetected {
                largest_improvement: best,
            }
        }
    }

    /// Fit `ln error = β · ln|t − t_c| + c` around the steepest change.
    pub fn fit_critical_exponent(&self, states: &[Matrix]) -> ExponentFit {
        self.fit_errors(&errors_of(states))
    }

    /// [`fit_critical_exponent`](Self::fit_critical_exponent) over a
    /// precomputed error series.
    ///
    /// The window is clipped at the ends of the series. The critical point
    /// itself and zero errors (fully converged steps) carry no log–log
    /// information and are skipped.
    pub fn fit_errors(&self, errors: &[f64]) -> ExponentFit {
        if errors.len() < MIN_FIT_POINTS {
            return ExponentFit::InsufficientData {
                required: MIN_FIT_POINTS,
                available: errors.len(),
            };
        }

        let critical = steepest_change(errors);
        let lo = critical.saturating_sub(self.window);
        let hi = (critical + self.window).min(errors.len() - 1);

        let (xs, ys): (Vec<f64>, Vec<f64>) = (lo..=hi)
            .filter(|&j| j != critical)
            .filter(|&j| errors[j] > 0.0 && errors[j].is_finite())
            .map(|j| ((j.abs_diff(critical) as f64).ln(), errors[j].ln()))
            .unzip();

        match least_squares(&xs, &ys) {
            Some((slope, intercept, r_squared)) => {
                debug!(critical, exponent = slope, r_squared, "critical exponent fitted");
                ExponentFit::Fitted {
                    critical_index: critical,
                    exponent: slope,
                    intercept,
                    r_squared,
                    points: xs.len(),
                }
            }
            None => ExponentFit::InsufficientData {
                required: MIN_FIT_POINTS,
                available: xs.len(),
            },
        }
    }
}

/// Consensus error of each state matrix.
pub fn errors_of(states: &[Matrix]) -> Vec<f64> {
    states.iter().map(consensus_error).collect()
}

/// Index `k` maximising `|e[k+1] − e[k]|`; first wins on ties.
fn steepest_change(errors: &[f64]) -> usize {
    let mut best = 0;
    let mut steepest = f64::NEG_INFINITY;
    for (k, w) in errors.windows(2).enumerate() {
        let slope = (w[1] - w[0]).abs();
        if slope > steepest {
            steepest = slope;
            best = k;
        }
    }
    best
}

/// Ordinary least squares. `None` with fewer than two points or when all
/// `x` coincide.
fn least_squares(xs: &[f64], ys: &[f64]) -> Option<(f64, f64, f64)> {
    let n = xs.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
        syy += (y - mean_y) * (y - mean_y);
    }
    if sxx <= f64::EPSILON {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if syy <= f64::EPSILON {
        1.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };
    Some((slope, intercept, r_squared))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_short_for_transition() {
        let analyzer = TransitionAnalyzer::default();
        assert_eq!(
            analyzer.detect_in_errors(&[1.0], 0.1),
            TransitionReport::InsufficientData { required: 2, available: 1 }
        );
    }

    #[test]
    fn sharp_drop_is_detected() {
        let analyzer = TransitionAnalyzer::default();
        let errors = [1.0, 0.95, 0.9, 0.3, 0.28, 0.27];
        match analyzer.detect_in_errors(&errors, 0.2) {
            TransitionReport::Detected { step, improvement, error_before, error_after } => {
                assert_eq!(step, 3);
                assert!((improvement - 0.6).abs() < 1e-12);
                assert_eq!(error_before, 0.9);
                assert_eq!(error_after, 0.3);
            }
            other => panic!("expected detection, got {:?}", other),
        }
    }

    #[test]
    fn gentle_decay_is_not_a_transition() {
        let analyzer = TransitionAnalyzer::default();
        let errors = [1.0, 0.95, 0.9, 0.85];
        let report = analyzer.detect_in_errors(&errors, 0.2);
        assert!(!report.is_detected());
        assert!(matches!(report, TransitionReport::NotDetected { .. }));
    }

    #[test]
    fn fit_needs_three_points() {
        let analyzer = TransitionAnalyzer::default();
        assert_eq!(
            analyzer.fit_errors(&[1.0, 0.5]),
            ExponentFit::InsufficientData { required: 3, available: 2 }
        );
    }

    #[test]
    fn recovers_power_law_exponent() {
        // error = 2 · |t − 0|^−1.5 for t ≥ 1, with a steep first drop from t=0.
        let mut errors = vec![100.0];
        errors.extend((1..=10).map(|t| 2.0 * (t as f64).powf(-1.5)));

        let fit = TransitionAnalyzer::new(5).fit_errors(&errors);
        match fit {
            ExponentFit::Fitted { critical_index, exponent, intercept, r_squared, points } => {
                assert_eq!(critical_index, 0);
                assert_eq!(points, 5);
                assert!((exponent + 1.5).abs() < 1e-9);
                assert!((intercept - 2f64.ln()).abs() < 1e-9);
                assert!((r_squared - 1.0).abs() < 1e-9);
            }
            other => panic!("expected a fit, got {:?}", other),
        }
    }

    #[test]
    fn window_clips_at_series_end() {
        // Steepest change at the last step; only the left side is available.
        let errors = [1.0, 0.9, 0.85, 0.82, 0.1];
        let fit = TransitionAnalyzer::new(10).fit_errors(&errors);
        match fit {
            ExponentFit::Fitted { critical_index, points, .. } => {
                assert_eq!(critical_index, 3);
                assert_eq!(points, 4);
            }
            other => panic!("expected a fit, got {:?}", other),
        }
    }

    #[test]
    fn fully_converged_points_are_skipped() {
        let errors = [1.0, 0.0, 0.0, 0.0];
        let fit = TransitionAnalyzer::default().fit_errors(&errors);
        assert!(matches!(fit, ExponentFit::InsufficientData { available: 0, .. }));
        assert_eq!(fit.exponent(), None);
    }

    #[test]
    fn analyzes_state_sequences() {
        let states: Vec<Matrix> = [2.0, 1.0, 0.1, 0.05]
            .iter()
            .map(|&s| Matrix::from_rows(&[[s], [0.0], [-s]]).unwrap())
            .collect();
        let report = TransitionAnalyzer::default().detect_phase_transition(&states, 0.1);
        assert!(matches!(report, TransitionReport::Detected { step: 1, .. }));
    }

    #[test]
    fn report_serializes_with_kind_tag() {
        let report = TransitionReport::NotDetected { largest_improvement: 0.01 };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "not_detected");
    }
}
