//! Loop controller with a fixed-timestep accumulator

use crate::config::{validate_fps_cap, validate_timestep, LoopConfig};
use crate::event::LoopEvent;
use crate::event_bus::EventBus;
use crate::frame::{FrameContext, Step};
use crate::scheduler::{FrameScheduler, FrameToken};
use crate::system::Simulation;
use cadence_core::Result;

/// Lifecycle of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No callback pending
    Stopped,
    /// `start` was called; waiting for the first display callback
    Started,
    /// Recurring callbacks are advancing the simulation
    Running,
}

/// What one display callback did
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The token was cancelled or stale; nothing ran
    Ignored,
    /// The settled first frame was drawn with interpolation 1
    FirstFrame,
    /// Skipped by the frame-rate cap; no update or draw
    Throttled,
    /// Ran `steps` updates and one draw
    Advanced {
        steps: u32,
        interpolation: f64,
        /// Time debt dropped because the catch-up cap was hit
        discarded_ms: Option<f64>,
    },
}

/// Converts display refreshes into fixed simulation steps.
///
/// Wall time between refreshes accumulates as debt and is paid off in
/// `simulation_timestep_ms` chunks. Whatever is left over becomes the
/// interpolation fraction for the draw. After each frame the debt is below
/// one timestep, unless the catch-up cap was hit, in which case the debt is
/// dropped entirely.
pub struct LoopController<S: FrameScheduler> {
    scheduler: S,
    simulation_timestep_ms: f64,
    /// Frame delta debt
    accumulated_ms: f64,
    last_frame_timestamp_ms: f64,
    fps: f64,
    fps_smoothing_factor: f64,
    fps_update_interval_ms: f64,
    last_fps_update_timestamp_ms: f64,
    frames_since_last_fps_update: u32,
    /// Zero when uncapped
    min_frame_interval_ms: f64,
    max_catch_up_steps: u32,
    state: LoopState,
    pending: Option<FrameToken>,
    events: EventBus,
}

impl<S: FrameScheduler> LoopController<S> {
    /// Create a stopped controller from a validated config
    pub fn new(config: &LoopConfig, scheduler: S) -> Result<Self> {
        config.validate()?;

        let mut controller = Self {
            scheduler,
            simulation_timestep_ms: config.simulation_timestep_ms,
            accumulated_ms: 0.0,
            last_frame_timestamp_ms: 0.0,
            fps: 60.0,
            fps_smoothing_factor: config.fps_smoothing_factor,
            fps_update_interval_ms: config.fps_update_interval_ms,
            last_fps_update_timestamp_ms: 0.0,
            frames_since_last_fps_update: 0,
            min_frame_interval_ms: 0.0,
            max_catch_up_steps: config.max_catch_up_steps,
            state: LoopState::Stopped,
            pending: None,
            events: EventBus::new(),
        };

        if let Some(fps) = config.max_allowed_fps {
            controller.set_max_allowed_fps(fps)?;
        }

        Ok(controller)
    }

    /// Schedule the first display callback. No-op unless stopped.
    pub fn start(&mut self) {
        if self.state != LoopState::Stopped {
            return;
        }
        self.state = LoopState::Started;
        self.pending = Some(self.scheduler.schedule_next());
        log::info!(
            "Loop starting ({:.3}ms timestep)",
            self.simulation_timestep_ms
        );
    }

    /// Stop the loop and cancel the pending callback. Idempotent.
    ///
    /// A frame already being processed is not interrupted.
    pub fn stop(&mut self) {
        let was_active = self.state != LoopState::Stopped;
        self.state = LoopState::Stopped;

        if let Some(token) = self.pending.take() {
            self.scheduler.cancel(token);
        }

        if was_active {
            log::info!("Loop stopped");
            self.events.push(LoopEvent::Stopped);
        }
    }

    /// Cap the display rate. `0` stops the loop.
    ///
    /// The cap skips refreshes that arrive too soon; it never sleeps.
    pub fn set_max_allowed_fps(&mut self, fps: f64) -> Result<()> {
        validate_fps_cap(fps)?;
        if fps == 0.0 {
            self.stop();
        } else {
            self.min_frame_interval_ms = 1000.0 / fps;
        }
        Ok(())
    }

    /// The current frame-rate cap, or `None` when uncapped
    pub fn max_allowed_fps(&self) -> Option<f64> {
        if self.min_frame_interval_ms > 0.0 {
            Some(1000.0 / self.min_frame_interval_ms)
        } else {
            None
        }
    }

    pub fn set_simulation_timestep_ms(&mut self, ms: f64) -> Result<()> {
        validate_timestep(ms)?;
        self.simulation_timestep_ms = ms;
        Ok(())
    }

    pub fn simulation_timestep_ms(&self) -> f64 {
        self.simulation_timestep_ms
    }

    /// Smoothed frames-per-second estimate
    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Wall time not yet simulated
    pub fn accumulated_ms(&self) -> f64 {
        self.accumulated_ms
    }

    /// The callback the controller is waiting for, if any
    pub fn pending_token(&self) -> Option<FrameToken> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Drain lifecycle and stall events
    pub fn drain_events(&mut self) -> Vec<LoopEvent> {
        self.events.drain()
    }

    /// Handle a display callback delivered by the host
    pub fn on_frame<A: Simulation + ?Sized>(
        &mut self,
        token: FrameToken,
        timestamp_ms: f64,
        sim: &mut A,
    ) -> FrameOutcome {
        if self.pending != Some(token) {
            return FrameOutcome::Ignored;
        }
        self.pending = None;

        match self.state {
            LoopState::Stopped => FrameOutcome::Ignored,
            LoopState::Started => self.first_frame(timestamp_ms, sim),
            LoopState::Running => self.animate(timestamp_ms, sim),
        }
    }

    fn first_frame<A: Simulation + ?Sized>(&mut self, timestamp_ms: f64, sim: &mut A) -> FrameOutcome {
        sim.draw(&FrameContext {
            interpolation: 1.0,
            simulation_timestep_ms: self.simulation_timestep_ms,
            timestamp_ms,
            steps: 0,
            fps: self.fps,
        });

        self.state = LoopState::Running;
        self.last_frame_timestamp_ms = timestamp_ms;
        self.last_fps_update_timestamp_ms = timestamp_ms;
        self.frames_since_last_fps_update = 0;
        self.pending = Some(self.scheduler.schedule_next());

        self.events.push(LoopEvent::Started { timestamp_ms });
        FrameOutcome::FirstFrame
    }

    fn animate<A: Simulation + ?Sized>(&mut self, timestamp_ms: f64, sim: &mut A) -> FrameOutcome {
        // Reschedule before doing any work so the cadence survives an early return
        self.pending = Some(self.scheduler.schedule_next());

        if timestamp_ms < self.last_frame_timestamp_ms + self.min_frame_interval_ms {
            return FrameOutcome::Throttled;
        }

        self.accumulated_ms += timestamp_ms - self.last_frame_timestamp_ms;
        self.last_frame_timestamp_ms = timestamp_ms;

        if timestamp_ms > self.last_fps_update_timestamp_ms + self.fps_update_interval_ms {
            // Frame count and rate are summed unnormalized; kept as-is for compatibility
            self.fps = self.fps_smoothing_factor * f64::from(self.frames_since_last_fps_update)
                + 1000.0 / (timestamp_ms - self.last_fps_update_timestamp_ms)
                + (1.0 - self.fps_smoothing_factor) * self.fps;

            self.last_fps_update_timestamp_ms = timestamp_ms;
            self.frames_since_last_fps_update = 0;
            self.events.push(LoopEvent::FpsUpdated { fps: self.fps });
        }

        self.frames_since_last_fps_update += 1;

        let mut steps = 0;
        let mut panicked = false;
        while self.accumulated_ms >= self.simulation_timestep_ms {
            sim.update(&Step {
                delta_ms: self.simulation_timestep_ms,
                index: steps,
            });
            self.accumulated_ms -= self.simulation_timestep_ms;

            steps += 1;
            if steps >= self.max_catch_up_steps {
                panicked = true;
                break;
            }
        }

        let interpolation = self.accumulated_ms / self.simulation_timestep_ms;
        sim.draw(&FrameContext {
            interpolation,
            simulation_timestep_ms: self.simulation_timestep_ms,
            timestamp_ms,
            steps,
            fps: self.fps,
        });

        let discarded_ms = if panicked {
            let discarded = std::mem::take(&mut self.accumulated_ms);
            log::warn!(
                "Main loop panicked after {} steps, probably because the host stalled. Discarding {}ms",
                steps,
                discarded.round()
            );
            self.events.push(LoopEvent::Stalled {
                steps,
                discarded_ms: discarded,
            });
            Some(discarded)
        } else {
            None
        };

        FrameOutcome::Advanced {
            steps,
            interpolation,
            discarded_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    /// Records every call the controller makes
    #[derive(Default)]
    struct Recorder {
        updates: Vec<f64>,
        draws: Vec<f64>,
    }

    impl Simulation for Recorder {
        fn update(&mut self, step: &Step) {
            self.updates.push(step.delta_ms);
        }

        fn draw(&mut self, frame: &FrameContext) {
            self.draws.push(frame.interpolation);
        }
    }

    fn controller(timestep_ms: f64) -> LoopController<ManualScheduler> {
        let config = LoopConfig {
            simulation_timestep_ms: timestep_ms,
            ..LoopConfig::default()
        };
        LoopController::new(&config, ManualScheduler::new()).unwrap()
    }

    /// Deliver one refresh to whatever is pending
    fn refresh(
        ctl: &mut LoopController<ManualScheduler>,
        timestamp_ms: f64,
        sim: &mut Recorder,
    ) -> FrameOutcome {
        let tokens = ctl.scheduler_mut().take_pending();
        let mut outcome = FrameOutcome::Ignored;
        for token in tokens {
            outcome = ctl.on_frame(token, timestamp_ms, sim);
        }
        outcome
    }

    /// Start and deliver the first frame at `t0`
    fn running(timestep_ms: f64, t0: f64, sim: &mut Recorder) -> LoopController<ManualScheduler> {
        let mut ctl = controller(timestep_ms);
        ctl.start();
        assert_eq!(refresh(&mut ctl, t0, sim), FrameOutcome::FirstFrame);
        sim.draws.clear();
        ctl.drain_events();
        ctl
    }

    #[test]
    fn test_start_draws_settled_first_frame() {
        let mut sim = Recorder::default();
        let mut ctl = controller(10.0);
        assert_eq!(ctl.state(), LoopState::Stopped);

        ctl.start();
        assert_eq!(ctl.state(), LoopState::Started);
        assert!(!ctl.is_running());

        assert_eq!(refresh(&mut ctl, 100.0, &mut sim), FrameOutcome::FirstFrame);
        assert!(ctl.is_running());
        assert_eq!(sim.draws, vec![1.0]);
        assert!(sim.updates.is_empty());
        assert!(ctl.scheduler().has_pending());
        assert_eq!(
            ctl.drain_events(),
            vec![LoopEvent::Started { timestamp_ms: 100.0 }]
        );
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut ctl = controller(10.0);
        ctl.start();
        ctl.start();
        assert_eq!(ctl.scheduler().requested(), 1);
    }

    #[test]
    fn test_one_step_at_exact_timestep() {
        let mut sim = Recorder::default();
        let mut ctl = running(10.0, 0.0, &mut sim);

        let outcome = refresh(&mut ctl, 10.0, &mut sim);
        assert_eq!(
            outcome,
            FrameOutcome::Advanced {
                steps: 1,
                interpolation: 0.0,
                discarded_ms: None
            }
        );
        assert_eq!(sim.updates, vec![10.0]);
        assert_eq!(sim.draws, vec![0.0]);
    }

    #[test]
    fn test_leftover_becomes_interpolation() {
        let mut sim = Recorder::default();
        let mut ctl = running(10.0, 0.0, &mut sim);

        refresh(&mut ctl, 25.0, &mut sim);
        assert_eq!(sim.updates.len(), 2);
        assert_eq!(sim.draws, vec![0.5]);
        assert_eq!(ctl.accumulated_ms(), 5.0);
    }

    #[test]
    fn test_k_timesteps_run_k_steps() {
        for k in [1u32, 3, 17, 239] {
            let mut sim = Recorder::default();
            let mut ctl = running(10.0, 0.0, &mut sim);

            let outcome = refresh(&mut ctl, f64::from(k) * 10.0, &mut sim);
            assert_eq!(sim.updates.len(), k as usize);
            assert_eq!(
                outcome,
                FrameOutcome::Advanced {
                    steps: k,
                    interpolation: 0.0,
                    discarded_ms: None
                }
            );
        }
    }

    #[test]
    fn test_fast_refresh_runs_at_most_one_step() {
        let mut sim = Recorder::default();
        let mut ctl = running(16.0, 0.0, &mut sim);

        for frame in 1..=200 {
            let before = sim.updates.len();
            refresh(&mut ctl, f64::from(frame) * 7.0, &mut sim);
            let steps = sim.updates.len() - before;
            assert!(steps <= 1, "frame {} ran {} steps", frame, steps);

            let alpha = *sim.draws.last().unwrap();
            assert!((0.0..1.0).contains(&alpha), "alpha {} out of range", alpha);
            assert!(ctl.accumulated_ms() < ctl.simulation_timestep_ms());
        }
    }

    #[test]
    fn test_stall_hits_catch_up_cap() {
        let mut sim = Recorder::default();
        let mut ctl = running(10.0, 0.0, &mut sim);

        let outcome = refresh(&mut ctl, 3000.0, &mut sim);
        assert_eq!(sim.updates.len(), 240);
        assert_eq!(
            outcome,
            FrameOutcome::Advanced {
                steps: 240,
                interpolation: 60.0,
                discarded_ms: Some(600.0)
            }
        );
        assert_eq!(ctl.accumulated_ms(), 0.0);
        assert!(ctl
            .drain_events()
            .contains(&LoopEvent::Stalled {
                steps: 240,
                discarded_ms: 600.0
            }));

        // next frame is back to normal
        sim.updates.clear();
        refresh(&mut ctl, 3010.0, &mut sim);
        assert_eq!(sim.updates.len(), 1);
    }

    #[test]
    fn test_exact_cap_triggers_panic_with_zero_discard() {
        let mut sim = Recorder::default();
        let mut ctl = running(10.0, 0.0, &mut sim);

        let outcome = refresh(&mut ctl, 2400.0, &mut sim);
        assert_eq!(
            outcome,
            FrameOutcome::Advanced {
                steps: 240,
                interpolation: 0.0,
                discarded_ms: Some(0.0)
            }
        );
    }

    #[test]
    fn test_custom_catch_up_cap() {
        let config = LoopConfig {
            simulation_timestep_ms: 10.0,
            max_catch_up_steps: 5,
            ..LoopConfig::default()
        };
        let mut ctl = LoopController::new(&config, ManualScheduler::new()).unwrap();
        let mut sim = Recorder::default();
        ctl.start();
        refresh(&mut ctl, 0.0, &mut sim);

        let outcome = refresh(&mut ctl, 100.0, &mut sim);
        assert_eq!(sim.updates.len(), 5);
        assert!(matches!(
            outcome,
            FrameOutcome::Advanced {
                discarded_ms: Some(d),
                ..
            } if d == 50.0
        ));
    }

    #[test]
    fn test_frame_cap_skips_every_other_refresh() {
        let mut sim = Recorder::default();
        let mut ctl = running(10.0, 0.0, &mut sim);
        ctl.set_max_allowed_fps(30.0).unwrap();

        let mut outcomes = Vec::new();
        for frame in 1..=8 {
            outcomes.push(refresh(&mut ctl, f64::from(frame) * 16.7, &mut sim));
        }

        for (i, outcome) in outcomes.iter().enumerate() {
            if i % 2 == 0 {
                assert_eq!(*outcome, FrameOutcome::Throttled, "refresh {}", i + 1);
            } else {
                assert!(matches!(outcome, FrameOutcome::Advanced { .. }), "refresh {}", i + 1);
            }
        }
        assert_eq!(sim.draws.len(), 4);
        // throttled frames still keep the cadence going
        assert!(ctl.scheduler().has_pending());
    }

    #[test]
    fn test_max_allowed_fps_roundtrip() {
        let mut ctl = controller(10.0);
        assert_eq!(ctl.max_allowed_fps(), None);
        ctl.set_max_allowed_fps(50.0).unwrap();
        assert!((ctl.max_allowed_fps().unwrap() - 50.0).abs() < 1e-9);
        assert!(ctl.set_max_allowed_fps(-1.0).is_err());
        assert!(ctl.set_max_allowed_fps(f64::NAN).is_err());
    }

    #[test]
    fn test_zero_fps_stops_loop() {
        let mut sim = Recorder::default();
        let mut ctl = running(10.0, 0.0, &mut sim);

        ctl.set_max_allowed_fps(0.0).unwrap();
        assert_eq!(ctl.state(), LoopState::Stopped);
        assert!(!ctl.scheduler().has_pending());
        assert_eq!(ctl.drain_events(), vec![LoopEvent::Stopped]);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut sim = Recorder::default();
        let mut ctl = running(10.0, 0.0, &mut sim);

        ctl.stop();
        let state = ctl.state();
        let accumulated = ctl.accumulated_ms();
        let cancelled = ctl.scheduler().cancelled();

        ctl.stop();
        assert_eq!(ctl.state(), state);
        assert_eq!(ctl.accumulated_ms(), accumulated);
        assert_eq!(ctl.scheduler().cancelled(), cancelled);
        assert_eq!(ctl.pending_token(), None);
        assert_eq!(ctl.drain_events(), vec![LoopEvent::Stopped]);
    }

    #[test]
    fn test_cancelled_token_is_ignored() {
        let mut sim = Recorder::default();
        let mut ctl = running(10.0, 0.0, &mut sim);
        let stale = ctl.pending_token().unwrap();

        ctl.stop();
        assert_eq!(ctl.on_frame(stale, 50.0, &mut sim), FrameOutcome::Ignored);
        assert!(sim.updates.is_empty());
        assert!(sim.draws.is_empty());
    }

    #[test]
    fn test_restart_after_stop() {
        let mut sim = Recorder::default();
        let mut ctl = running(10.0, 0.0, &mut sim);
        refresh(&mut ctl, 25.0, &mut sim);
        ctl.stop();

        ctl.start();
        assert_eq!(refresh(&mut ctl, 1000.0, &mut sim), FrameOutcome::FirstFrame);

        // the long gap while stopped is not simulated
        sim.updates.clear();
        refresh(&mut ctl, 1010.0, &mut sim);
        assert_eq!(sim.updates.len(), 1);
    }

    #[test]
    fn test_fps_estimate_formula() {
        let mut sim = Recorder::default();
        let mut ctl = running(10.0, 0.0, &mut sim);

        // 100 refreshes 10ms apart; the estimate is only recomputed once the
        // interval has strictly elapsed
        for frame in 1..=100 {
            refresh(&mut ctl, f64::from(frame) * 10.0, &mut sim);
        }
        assert_eq!(ctl.fps(), 60.0);

        refresh(&mut ctl, 1010.0, &mut sim);
        let expected = 0.9 * 100.0 + 1000.0 / 1010.0 + 0.1 * 60.0;
        assert!((ctl.fps() - expected).abs() < 1e-9);
        assert!(ctl
            .drain_events()
            .iter()
            .any(|e| matches!(e, LoopEvent::FpsUpdated { .. })));
    }

    #[test]
    fn test_invalid_timestep_rejected() {
        let config = LoopConfig {
            simulation_timestep_ms: 0.0,
            ..LoopConfig::default()
        };
        assert!(LoopController::new(&config, ManualScheduler::new()).is_err());

        let mut ctl = controller(10.0);
        assert!(ctl.set_simulation_timestep_ms(-1.0).is_err());
        ctl.set_simulation_timestep_ms(20.0).unwrap();
        assert_eq!(ctl.simulation_timestep_ms(), 20.0);
    }

    #[test]
    fn test_config_zero_cap_starts_stopped() {
        let config = LoopConfig {
            max_allowed_fps: Some(0.0),
            ..LoopConfig::default()
        };
        let ctl = LoopController::new(&config, ManualScheduler::new()).unwrap();
        assert_eq!(ctl.state(), LoopState::Stopped);
        assert_eq!(ctl.max_allowed_fps(), None);
    }
}
