//! Loop configuration
//!
//! Loaded from TOML; omitted keys take their defaults. Every value is
//! validated when the config is loaded, so a bad timestep fails here rather
//! than inside the loop.

use cadence_core::{CadenceError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Recognized loop options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Fixed simulation step in milliseconds
    #[serde(default = "default_simulation_timestep_ms")]
    pub simulation_timestep_ms: f64,
    /// Display frame-rate cap. `None` is uncapped; `0` stops the loop.
    #[serde(default)]
    pub max_allowed_fps: Option<f64>,
    /// Weight of the newest sample in the FPS estimate
    #[serde(default = "default_fps_smoothing_factor")]
    pub fps_smoothing_factor: f64,
    /// How often the FPS estimate is recomputed
    #[serde(default = "default_fps_update_interval_ms")]
    pub fps_update_interval_ms: f64,
    /// Fixed steps allowed per frame before the remaining debt is dropped
    #[serde(default = "default_max_catch_up_steps")]
    pub max_catch_up_steps: u32,
}

fn default_simulation_timestep_ms() -> f64 {
    1000.0 / 60.0
}
fn default_fps_smoothing_factor() -> f64 {
    0.9
}
fn default_fps_update_interval_ms() -> f64 {
    1000.0
}
fn default_max_catch_up_steps() -> u32 {
    240
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            simulation_timestep_ms: default_simulation_timestep_ms(),
            max_allowed_fps: None,
            fps_smoothing_factor: default_fps_smoothing_factor(),
            fps_update_interval_ms: default_fps_update_interval_ms(),
            max_catch_up_steps: default_max_catch_up_steps(),
        }
    }
}

impl LoopConfig {
    /// Parse and validate a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LoopConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LoopConfig = toml::from_str(&content).map_err(|e| {
            CadenceError::TomlParseError(format!(
                "Failed to parse config {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| CadenceError::Serialization(e.to_string()))
    }

    /// Check every option against its allowed range
    pub fn validate(&self) -> Result<()> {
        validate_timestep(self.simulation_timestep_ms)?;

        if let Some(fps) = self.max_allowed_fps {
            validate_fps_cap(fps)?;
        }

        if !(0.0..=1.0).contains(&self.fps_smoothing_factor) {
            return Err(CadenceError::ValueOutOfRange {
                field: "fps_smoothing_factor".into(),
                min: 0.0,
                max: 1.0,
                value: self.fps_smoothing_factor,
            });
        }

        if !(self.fps_update_interval_ms.is_finite() && self.fps_update_interval_ms > 0.0) {
            return Err(CadenceError::InvalidConfig(format!(
                "fps_update_interval_ms must be positive, got {}",
                self.fps_update_interval_ms
            )));
        }

        if self.max_catch_up_steps == 0 {
            return Err(CadenceError::InvalidConfig(
                "max_catch_up_steps must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

pub(crate) fn validate_timestep(ms: f64) -> Result<()> {
    if ms.is_finite() && ms > 0.0 {
        Ok(())
    } else {
        Err(CadenceError::InvalidConfig(format!(
            "simulation_timestep_ms must be positive, got {}",
            ms
        )))
    }
}

pub(crate) fn validate_fps_cap(fps: f64) -> Result<()> {
    if fps.is_finite() && fps >= 0.0 {
        Ok(())
    } else {
        Err(CadenceError::InvalidConfig(format!(
            "max_allowed_fps must be zero or positive, got {}",
            fps
        )))
    }
}
