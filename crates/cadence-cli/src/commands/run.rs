//! Run command: drive the demo world through the fixed-step loop

use super::load_config;
use crate::demo::{build_world, TextRenderer};
use anyhow::{bail, Context, Result};
use cadence_runtime::{
    Game, HeadlessHost, LoopController, LoopEvent, ManualScheduler, RealtimeHost, RunSummary,
    Stall,
};
use std::time::Duration;

pub struct RunArgs {
    pub config: Option<String>,
    pub frames: u64,
    pub refresh_hz: f64,
    pub stall_at: Option<u64>,
    pub stall_ms: f64,
    pub max_fps: Option<f64>,
    pub timestep_ms: Option<f64>,
    pub realtime: bool,
    pub seconds: f64,
    pub print_every: u64,
    pub bodies: usize,
    pub list_entities: bool,
}

/// What a finished run produced
struct RunOutcome {
    summary: RunSummary,
    fps: f64,
    events: Vec<LoopEvent>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let outcome = drive(&args)?;

    for event in &outcome.events {
        match event {
            LoopEvent::Stalled {
                steps,
                discarded_ms,
            } => println!(
                "Stall: ran {} steps, discarded {:.1}ms of simulation time",
                steps, discarded_ms
            ),
            other => log::debug!("{:?}", other),
        }
    }

    print_summary(&outcome.summary, outcome.fps);
    Ok(())
}

fn drive(args: &RunArgs) -> Result<RunOutcome> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(ms) = args.timestep_ms {
        config.simulation_timestep_ms = ms;
    }
    if let Some(fps) = args.max_fps {
        config.max_allowed_fps = Some(fps);
    }
    config.validate().context("Invalid loop configuration")?;

    let world = build_world(args.bodies).context("Failed to build demo world")?;
    if args.list_entities {
        println!("{}", serde_json::to_string_pretty(&world.all_entities())?);
    }

    let mut game = Game::new(world).with_system(Box::new(TextRenderer::new(args.print_every)));
    game.initialize().context("Failed to initialize systems")?;

    let mut controller = LoopController::new(&config, ManualScheduler::new())?;
    // A zero cap means the loop is stopped; never start it
    if config.max_allowed_fps == Some(0.0) {
        println!("max_allowed_fps is 0: the loop stays stopped");
    } else {
        controller.start();
    }

    let summary = if args.realtime {
        if !(args.seconds.is_finite() && args.seconds > 0.0) {
            bail!("--seconds must be positive, got {}", args.seconds);
        }
        println!(
            "Running {} entities in real time for {:.1}s ({} Hz)",
            game.world().entity_count(),
            args.seconds,
            args.refresh_hz
        );
        let host = RealtimeHost::new(args.refresh_hz)?;
        host.run(
            &mut controller,
            &mut game,
            Duration::from_secs_f64(args.seconds),
        )
    } else {
        let mut host = HeadlessHost::new(args.refresh_hz)?;
        if let Some(at_refresh) = args.stall_at {
            host = host.with_stall(Stall {
                at_refresh,
                duration_ms: args.stall_ms,
            });
        }
        println!(
            "Running {} entities for {} refreshes ({} Hz, timestep {:.3}ms)",
            game.world().entity_count(),
            args.frames,
            args.refresh_hz,
            config.simulation_timestep_ms
        );
        host.run(&mut controller, &mut game, args.frames)
    };

    controller.stop();
    let events = controller.drain_events();
    game.shutdown().context("Failed to shut down systems")?;

    Ok(RunOutcome {
        summary,
        fps: controller.fps(),
        events,
    })
}

fn print_summary(summary: &RunSummary, fps: f64) {
    println!();
    println!("Run complete:");
    println!("  refreshes:    {}", summary.refreshes);
    println!("  frames drawn: {}", summary.frames_drawn);
    println!("  throttled:    {}", summary.throttled);
    println!("  steps:        {}", summary.steps);
    println!("  stalls:       {}", summary.stalls);
    if summary.stalls > 0 {
        println!("  discarded:    {:.1}ms", summary.discarded_ms);
    }
    println!("  last frame:   {:.1}ms", summary.last_timestamp_ms);
    println!("  fps estimate: {:.1}", fps);
}
