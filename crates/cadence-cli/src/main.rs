//! Cadence CLI - Run the fixed-step loop demo and check loop configs

mod commands;
mod demo;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, run};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Fixed-timestep game loop with interpolated rendering", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo world through the loop and print interpolated frames
    Run {
        /// Path to a loop config file (TOML)
        #[arg(long)]
        config: Option<String>,

        /// Number of display refreshes to simulate (headless mode)
        #[arg(long, default_value = "120")]
        frames: u64,

        /// Display refresh rate in Hz
        #[arg(long, default_value = "60")]
        refresh_hz: f64,

        /// Inject a pause before this refresh index
        #[arg(long)]
        stall_at: Option<u64>,

        /// Length of the injected pause
        #[arg(long, default_value = "5000")]
        stall_ms: f64,

        /// Cap the display frame rate (0 stops the loop)
        #[arg(long)]
        max_fps: Option<f64>,

        /// Override the simulation timestep in milliseconds
        #[arg(long)]
        timestep_ms: Option<f64>,

        /// Drive the loop from the wall clock instead of a synthetic one
        #[arg(long)]
        realtime: bool,

        /// How long to run in realtime mode
        #[arg(long, default_value = "2")]
        seconds: f64,

        /// Print a snapshot every N drawn frames
        #[arg(long, default_value = "30")]
        print_every: u64,

        /// Number of demo entities
        #[arg(long, default_value = "3")]
        bodies: usize,

        /// Print the demo world as JSON before running
        #[arg(long)]
        list_entities: bool,
    },

    /// Load and validate a loop config file
    CheckConfig {
        /// Path to the config file
        path: String,

        /// Output format (text, toml or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            frames,
            refresh_hz,
            stall_at,
            stall_ms,
            max_fps,
            timestep_ms,
            realtime,
            seconds,
            print_every,
            bodies,
            list_entities,
        } => run::run(run::RunArgs {
            config,
            frames,
            refresh_hz,
            stall_at,
            stall_ms,
            max_fps,
            timestep_ms,
            realtime,
            seconds,
            print_every,
            bodies,
            list_entities,
        }),
        Commands::CheckConfig { path, format } => check::run(check::CheckArgs { path, format }),
    }
}
