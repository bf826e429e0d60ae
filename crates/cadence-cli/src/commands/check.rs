//! Config check command

use super::load_config;
use anyhow::{bail, Result};

pub struct CheckArgs {
    pub path: String,
    pub format: String,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let config = load_config(Some(&args.path))?;

    match args.format.as_str() {
        "toml" => print!("{}", config.to_toml_string()?),
        "json" => println!("{}", serde_json::to_string_pretty(&config)?),
        "text" => {
            println!("Config OK: {}", args.path);
            println!("  simulation_timestep_ms = {}", config.simulation_timestep_ms);
            match config.max_allowed_fps {
                Some(fps) => println!("  max_allowed_fps        = {}", fps),
                None => println!("  max_allowed_fps        = uncapped"),
            }
            println!("  fps_smoothing_factor   = {}", config.fps_smoothing_factor);
            println!("  fps_update_interval_ms = {}", config.fps_update_interval_ms);
            println!("  max_catch_up_steps     = {}", config.max_catch_up_steps);
        }
        other => bail!("Unknown format '{}'. Use text, toml or json.", other),
    }

    Ok(())
}
