//! Command implementations producing serializable reports.

use serde::Serialize;
use tracing::info;
use triad_consensus::{
    ConsensusSimulator, ExponentFit, SimulationRun, TransitionAnalyzer, TransitionReport,
};
use triad_graph::ConsensusGraph;
use triad_phase::{
    CriticalPointNavigator, NavigationGuidance, PhaseClassifier, RollbackDecision, RollbackPlan,
};

use crate::config::CliConfig;
use crate::error::Result;

/// Spectral summary of the simulated graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub labels: Vec<String>,
    pub eigenvalues: Vec<f64>,
    pub algebraic_connectivity: f64,
    pub mixing_time: f64,
    pub stability_bound: f64,
}

impl GraphSummary {
    pub fn of(graph: &ConsensusGraph, epsilon: f64) -> Self {
        Self {
            labels: graph.labels().to_vec(),
            eigenvalues: graph.eigenvalues().to_vec(),
            algebraic_connectivity: graph.algebraic_connectivity(),
            mixing_time: graph.mixing_time(epsilon),
            stability_bound: graph.stability_bound(),
        }
    }
}

/// Output of `triad simulate`.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub graph: GraphSummary,
    pub run: SimulationRun,
}

/// Output of `triad analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub graph: GraphSummary,
    pub final_error: f64,
    pub mixing_progress: f64,
    pub transition: TransitionReport,
    pub exponent_fit: ExponentFit,
}

/// One replayed navigator observation.
#[derive(Debug, Clone, Serialize)]
pub struct NavigationEntry {
    pub guidance: NavigationGuidance,
    pub decision: RollbackDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<RollbackPlan>,
}

/// Output of `triad navigate`.
#[derive(Debug, Clone, Serialize)]
pub struct NavigationReport {
    pub entries: Vec<NavigationEntry>,
    pub rollbacks: usize,
}

/// Run the configured simulation on the triad.
pub fn simulate(config: &CliConfig) -> Result<SimulationReport> {
    let graph = ConsensusGraph::triad();
    let summary = GraphSummary::of(&graph, config.simulator.epsilon);
    let simulator = ConsensusSimulator::with_config(graph, config.simulator.clone());
    let run = simulator.run(&config.initial_matrix()?, config.dt, config.steps)?;

    if let Some(last) = run.final_step() {
        info!(
            steps = config.steps,
            final_error = last.consensus_error,
            "simulation complete"
        );
    }
    Ok(SimulationReport {
        graph: summary,
        run,
    })
}

/// Simulate, then look for transitions and fit the critical exponent.
pub fn analyze(config: &CliConfig) -> Result<AnalysisReport> {
    let SimulationReport { graph, run } = simulate(config)?;
    let analyzer = TransitionAnalyzer::new(config.window);
    let (final_error, mixing_progress) = run
        .final_step()
        .map(|s| (s.consensus_error, s.mixing_progress))
        .unwrap_or((0.0, 1.0));

    Ok(AnalysisReport {
        graph,
        final_error,
        mixing_progress,
        transition: analyzer.detect_phase_transition(&run.trajectory, config.threshold),
        exponent_fit: analyzer.fit_critical_exponent(&run.trajectory),
    })
}

/// Replay `(coordinate, burden)` readings through a fresh navigator.
pub fn navigate(config: &CliConfig, readings: &[(f64, f64)]) -> Result<NavigationReport> {
    let classifier = PhaseClassifier::new(config.bands.clone())?;
    let mut navigator = CriticalPointNavigator::new(classifier, config.navigator.clone())?;

    let mut entries = Vec::with_capacity(readings.len());
    for &(coordinate, burden) in readings {
        let guidance = navigator.navigate(coordinate, burden);
        let decision = navigator.should_rollback(&guidance);
        let plan = decision.rollback.then(|| navigator.rollback_plan());
        entries.push(NavigationEntry {
            guidance,
            decision,
            plan,
        });
    }

    let rollbacks = entries.iter().filter(|e| e.decision.rollback).count();
    info!(readings = readings.len(), rollbacks, "navigation replay complete");
    Ok(NavigationReport { entries, rollbacks })
}

/// Parse `z burden z burden ...` into pairs.
pub fn parse_readings(args: &[String]) -> std::result::Result<Vec<(f64, f64)>, String> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err("navigate expects pairs of <coordinate> <burden>".to_string());
    }
    args.chunks(2)
        .map(|pair| {
            let z = pair[0]
                .parse()
                .map_err(|_| format!("invalid coordinate {:?}", pair[0]))?;
            let b = pair[1]
                .parse()
                .map_err(|_| format!("invalid burden {:?}", pair[1]))?;
            Ok((z, b))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_default_converges() {
        let report = simulate(&CliConfig::default()).unwrap();
        let last = report.run.final_step().unwrap();
        assert!(last.consensus_error < 1e-3);
        assert_eq!(report.graph.labels, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn analyze_reports_first_step_transition() {
        let report = analyze(&CliConfig::default()).unwrap();
        assert!(report.transition.is_detected());
        assert!(report.mixing_progress > 0.99);
    }

    #[test]
    fn simulate_propagates_shape_errors() {
        let config = CliConfig {
            initial_states: vec![vec![1.0], vec![2.0]],
            ..CliConfig::default()
        };
        assert!(matches!(simulate(&config), Err(crate::Error::Simulation(_))));
    }

    #[test]
    fn navigate_attaches_plan_on_rollback() {
        let readings = vec![(0.867, 0.9); 3];
        let report = navigate(&CliConfig::default(), &readings).unwrap();
        assert_eq!(report.rollbacks, 1);
        assert!(report.entries[2].plan.is_some());
        assert!(report.entries[0].plan.is_none());
    }

    #[test]
    fn readings_must_pair_up() {
        let args: Vec<String> = ["0.8", "0.1", "0.9"].iter().map(|s| s.to_string()).collect();
        assert!(parse_readings(&args).is_err());
        let parsed = parse_readings(&args[..2]).unwrap();
        assert_eq!(parsed, vec![(0.8, 0.1)]);
    }
}
