//! Cadence Runtime - Game loop infrastructure
//!
//! Provides the core game loop building blocks:
//! - `LoopController` — fixed-timestep accumulator driven by display refresh callbacks
//! - `FrameScheduler` — the host's "schedule next frame" primitive, injected into the controller
//! - `Step` / `FrameContext` — per-step and per-frame data handed to the simulation
//! - `LoopEvent` / `EventBus` — lifecycle and stall notifications
//! - `RuntimeSystem` / `Game` — systems ticked and drawn by the loop over a `World`
//! - `HeadlessHost` / `RealtimeHost` — drivers that deliver refresh timestamps

mod clock;
mod config;
mod event;
mod event_bus;
mod frame;
mod game;
mod host;
mod scheduler;
mod system;

pub use clock::{FrameOutcome, LoopController, LoopState};
pub use config::LoopConfig;
pub use event::LoopEvent;
pub use event_bus::{EventBus, DEFAULT_EVENT_CAPACITY};
pub use frame::{FrameContext, Step};
pub use game::Game;
pub use host::{HeadlessHost, RealtimeHost, RunSummary, Stall};
pub use scheduler::{FrameScheduler, FrameToken, ManualScheduler};
pub use system::{RuntimeSystem, Simulation};
