//! A world plus the systems that tick and draw it

use crate::frame::{FrameContext, Step};
use crate::system::{RuntimeSystem, Simulation};
use cadence_core::Result;
use cadence_ecs::World;

/// Owns the entity world and an ordered list of runtime systems.
///
/// Each fixed step advances every component first, then runs each system's
/// `fixed_update`. Each displayed frame runs each system's `draw`. A failing
/// system is logged and skipped for that call; the loop keeps going.
pub struct Game {
    world: World,
    systems: Vec<Box<dyn RuntimeSystem>>,
    initialized: bool,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(World::new())
    }
}

impl Game {
    pub fn new(world: World) -> Self {
        Self {
            world,
            systems: Vec::new(),
            initialized: false,
        }
    }

    /// Register a system; systems run in registration order
    pub fn add_system(&mut self, system: Box<dyn RuntimeSystem>) {
        self.systems.push(system);
    }

    pub fn with_system(mut self, system: Box<dyn RuntimeSystem>) -> Self {
        self.add_system(system);
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Initialize every system once. Stops at the first failure.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        for system in &mut self.systems {
            system.initialize(&mut self.world)?;
            log::debug!("Initialized system '{}'", system.name());
        }
        self.initialized = true;
        Ok(())
    }

    /// Shut down every system, returning the first error after trying them all
    pub fn shutdown(&mut self) -> Result<()> {
        let mut first_error = None;
        for system in &mut self.systems {
            if let Err(e) = system.shutdown() {
                log::error!("System '{}' failed to shut down: {}", system.name(), e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        self.initialized = false;
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Simulation for Game {
    fn update(&mut self, step: &Step) {
        self.world.update(step.delta_ms);

        for system in &mut self.systems {
            if let Err(e) = system.fixed_update(&mut self.world, step) {
                log::error!("System '{}' fixed update failed: {}", system.name(), e);
            }
        }
    }

    fn draw(&mut self, frame: &FrameContext) {
        for system in &mut self.systems {
            if let Err(e) = system.draw(&self.world, frame) {
                log::error!("System '{}' draw failed: {}", system.name(), e);
            }
        }
    }
}
