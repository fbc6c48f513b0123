//! Command-line runner for the Excitation medium simulator.
//!
//! Loads a grid file, runs the simulation for the requested duration with
//! the given phase rates, and prints the final grid to stdout. Logs go to
//! stderr.
//!
//! # Usage
//!
//! ```bash
//! # 5 time units, slow rise and decay, ASCII output
//! excitation-engine grid.txt 5.0 0.01 -0.01
//!
//! # JSON output, with a frame printed every 5 steps
//! excitation-engine grid.txt 10.0 2.0 -5.0 --format json --frames 5
//! ```
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration (`--config`, else `excitation-config.yaml` if present)
//! 3. Initialize structured logging (tracing)
//! 4. Load the grid file
//! 5. Run the simulation
//! 6. Print the final grid

mod error;
mod frames;
mod loader;
mod render;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use excitation_core::{NoOpCallback, Simulation, SimulationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::frames::FrameCallback;
use crate::render::OutputFormat;

/// Default configuration file, read from the working directory if present.
const DEFAULT_CONFIG_PATH: &str = "excitation-config.yaml";

/// Simulate an excitable medium on a square grid.
#[derive(Debug, Parser)]
#[command(name = "excitation-engine")]
#[command(version, about, long_about = None)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Grid file: the size N followed by N*N `<state> <value>` pairs
    input: PathBuf,

    /// Total simulated time
    final_time: f64,

    /// Rate of the increasing phase
    a_incr: f64,

    /// Rate of the decreasing phase (negative for decay)
    a_decr: f64,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format for the final grid
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Ascii)]
    format: OutputFormat,

    /// Also print the ASCII grid every N steps
    #[arg(long, value_name = "N")]
    frames: Option<u32>,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration or grid cannot be loaded, the
/// simulation fails, or the output cannot be written.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    config.run.final_time = cli.final_time;
    config.run.a_incr = cli.a_incr;
    config.run.a_decr = cli.a_decr;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    info!("excitation-engine starting");
    info!(
        dt = config.medium.dt,
        diffusion_coeff = config.medium.diffusion_coeff,
        threshold = config.medium.threshold,
        peak = config.medium.peak,
        rest = config.medium.rest,
        "Configuration loaded"
    );

    run(&cli, &config)?;
    Ok(())
}

fn run(cli: &Cli, config: &SimulationConfig) -> Result<(), EngineError> {
    let grid = loader::load_grid(&cli.input)?;
    info!(
        path = %cli.input.display(),
        size = grid.size(),
        excited = grid.state_counts().excited(),
        "Grid loaded"
    );

    let mut simulation = Simulation::new(grid, config)?;
    let stdout = std::io::stdout();

    let summary = match cli.frames {
        Some(every) => {
            let mut frames = FrameCallback::new(stdout.lock(), every);
            let summary = simulation.run(&mut frames)?;
            frames.finish()?;
            summary
        }
        None => simulation.run(&mut NoOpCallback)?,
    };
    info!(
        steps = summary.steps,
        activations = summary.activations,
        transitions = summary.transitions,
        "Run finished"
    );

    let output = render::render(simulation.grid(), cli.format)?;
    let mut out = stdout.lock();
    out.write_all(output.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Load configuration from `path`, or from [`DEFAULT_CONFIG_PATH`] if it
/// exists, or fall back to defaults.
fn load_config(path: Option<&Path>) -> Result<SimulationConfig, EngineError> {
    if let Some(path) = path {
        return Ok(SimulationConfig::from_file(path)?);
    }
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        Ok(SimulationConfig::from_file(default_path)?)
    } else {
        Ok(SimulationConfig::default())
    }
}
