//! CLI command implementations

pub mod check;
pub mod run;

use anyhow::{Context, Result};
use cadence_runtime::LoopConfig;
use std::path::Path;

/// Load a config file, or fall back to defaults when none is given
pub fn load_config(path: Option<&str>) -> Result<LoopConfig> {
    match path {
        Some(p) => LoopConfig::load(Path::new(p))
            .with_context(|| format!("Failed to load config '{}'", p)),
        None => Ok(LoopConfig::default()),
    }
}
