//! Simulation and runtime system traits

use crate::frame::{FrameContext, Step};
use cadence_core::Result;
use cadence_ecs::World;

/// What the loop controller drives.
///
/// `update` runs once per fixed step and must be deterministic for a given
/// step and starting state. `draw` runs once per displayed frame, after every
/// `update` of that frame.
pub trait Simulation {
    fn update(&mut self, step: &Step);

    fn draw(&mut self, frame: &FrameContext);
}

/// A system that can be ticked by the game loop
///
/// Systems are updated in registration order. `fixed_update` runs once per
/// simulation step after the world's components have advanced; `draw` runs
/// once per displayed frame (rendering).
pub trait RuntimeSystem {
    /// Called once before the first frame
    fn initialize(&mut self, _world: &mut World) -> Result<()> {
        Ok(())
    }

    /// Called at the fixed simulation rate
    fn fixed_update(&mut self, _world: &mut World, _step: &Step) -> Result<()> {
        Ok(())
    }

    /// Called once per displayed frame with the interpolation fraction
    fn draw(&mut self, _world: &World, _frame: &FrameContext) -> Result<()> {
        Ok(())
    }

    /// Called when the system is being shut down
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
