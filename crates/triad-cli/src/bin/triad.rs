//! triad CLI
//!
//! Usage:
//!   triad simulate [--config <path>]
//!   triad analyze [--config <path>]
//!   triad navigate [--config <path>] <z> <burden> [<z> <burden> ...]

use std::path::PathBuf;
use std::process::ExitCode;

use triad_cli::{analyze, navigate, parse_readings, simulate, CliConfig, Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_usage() {
    eprintln!("triad - consensus simulation and critical-point navigation");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  triad simulate [--config <path>]                 Run the diffusion simulation");
    eprintln!("  triad analyze [--config <path>]                  Simulate and fit transitions");
    eprintln!("  triad navigate [--config <path>] <z> <burden>... Replay navigator readings");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRIAD_DT         Integration step size (default: 0.1)");
    eprintln!("  TRIAD_STEPS      Number of steps (default: 50)");
    eprintln!("  TRIAD_EPSILON    Agreement threshold (default: 0.001)");
    eprintln!("  TRIAD_WINDOW     Exponent fit half-window (default: 5)");
    eprintln!("  TRIAD_THRESHOLD  Transition improvement threshold (default: 0.1)");
    eprintln!("  RUST_LOG         Log filter (default: triad=info)");
}

/// Strip `--config <path>` out of the argument list.
fn take_config_path(args: &mut Vec<String>) -> Result<Option<PathBuf>> {
    match args.iter().position(|a| a == "--config") {
        None => Ok(None),
        Some(i) if i + 1 < args.len() => {
            let path = PathBuf::from(args.remove(i + 1));
            args.remove(i);
            Ok(Some(path))
        }
        Some(_) => Err(Error::Usage("--config requires a path".to_string())),
    }
}

fn run(mut args: Vec<String>) -> Result<()> {
    let config_path = take_config_path(&mut args)?;
    let config = CliConfig::load(config_path.as_deref())?;

    let command = args.first().map(String::as_str);
    let output = match command {
        Some("simulate") => serde_json::to_string_pretty(&simulate(&config)?)?,
        Some("analyze") => serde_json::to_string_pretty(&analyze(&config)?)?,
        Some("navigate") => {
            let readings = parse_readings(&args[1..]).map_err(Error::Usage)?;
            serde_json::to_string_pretty(&navigate(&config, &readings)?)?
        }
        Some(other) => return Err(Error::Usage(format!("unknown command {:?}", other))),
        None => return Err(Error::Usage("missing command".to_string())),
    };
    println!("{}", output);
    Ok(())
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triad=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Usage(msg)) => {
            eprintln!("Error: {}", msg);
            eprintln!();
            print_usage();
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
