//! Triad Command-Line Driver
//!
//! Runs the consensus simulator, the transition analyzer and the
//! critical-point navigator from the command line, emitting JSON reports.
//!
//! # Usage
//!
//! ```text
//! triad simulate [--config <path>]
//! triad analyze  [--config <path>]
//! triad navigate [--config <path>] <z> <burden> [<z> <burden> ...]
//! ```

mod config;
mod error;
mod report;

pub use config::CliConfig;
pub use error::{Error, Result};
pub use report::{
    analyze, navigate, parse_readings, simulate, AnalysisReport, GraphSummary, NavigationEntry,
    NavigationReport, SimulationReport,
};
