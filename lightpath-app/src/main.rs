use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod plotting;
mod workflow;

#[derive(Parser, Debug)]
#[command(name = "lightpath")]
#[command(about = "Simulate an end-to-end optical fiber link")]
#[command(version)]
struct Args {
    /// Verbose output (stage-by-stage diagnostics)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a scenario and write metrics, waveforms and plots
    Run {
        /// Scenario YAML file
        scenario: PathBuf,

        /// Directory that receives the timestamped run folder
        #[arg(short, long, default_value = "./runs")]
        output_dir: PathBuf,

        /// Seed for the run generator (overrides the scenario's seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Skip PNG rendering
        #[arg(long)]
        no_plots: bool,
    },
    /// Load and validate a scenario without simulating it
    Check {
        /// Scenario YAML file
        scenario: PathBuf,
    },
    /// Re-render the plots of a previous run from its saved waveforms
    Replot {
        /// Run folder created by `lightpath run`
        run_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_target(false)
        .init();

    println!("--- Lightpath Optical Link Simulator ---");

    match args.command {
        Command::Run {
            scenario,
            output_dir,
            seed,
            no_plots,
        } => {
            let options = workflow::RunOptions {
                output_dir,
                seed,
                plots: !no_plots,
            };
            workflow::run_scenario(&scenario, &options)
        }
        Command::Check { scenario } => workflow::check_scenario(&scenario),
        Command::Replot { run_dir } => workflow::replot(&run_dir),
    }
}
