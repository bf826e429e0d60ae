//! Hosts that own the display clock and deliver refresh callbacks

use crate::clock::{FrameOutcome, LoopController};
use crate::scheduler::ManualScheduler;
use crate::system::Simulation;
use cadence_core::{CadenceError, Result};
use instant::Instant;
use std::time::Duration;

/// An injected pause in the synthetic display clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stall {
    /// Refresh index the pause happens before
    pub at_refresh: u64,
    pub duration_ms: f64,
}

/// Totals gathered while a host drives the loop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Display refreshes that had a callback to deliver
    pub refreshes: u64,
    /// Frames drawn, including the settled first frame
    pub frames_drawn: u64,
    /// Refreshes skipped by the frame-rate cap
    pub throttled: u64,
    /// Fixed simulation steps run
    pub steps: u64,
    /// Frames where the catch-up cap was hit
    pub stalls: u32,
    /// Total time debt dropped by stalls
    pub discarded_ms: f64,
    pub last_timestamp_ms: f64,
}

impl RunSummary {
    fn record(&mut self, outcome: &FrameOutcome) {
        match outcome {
            FrameOutcome::Ignored => {}
            FrameOutcome::FirstFrame => self.frames_drawn += 1,
            FrameOutcome::Throttled => self.throttled += 1,
            FrameOutcome::Advanced {
                steps,
                discarded_ms,
                ..
            } => {
                self.frames_drawn += 1;
                self.steps += u64::from(*steps);
                if let Some(discarded) = discarded_ms {
                    self.stalls += 1;
                    self.discarded_ms += discarded;
                }
            }
        }
    }
}

fn refresh_interval_ms(refresh_hz: f64) -> Result<f64> {
    if refresh_hz.is_finite() && refresh_hz > 0.0 {
        Ok(1000.0 / refresh_hz)
    } else {
        Err(CadenceError::InvalidConfig(format!(
            "refresh rate must be positive, got {}",
            refresh_hz
        )))
    }
}

/// Deliver every pending callback for one refresh
fn deliver<A: Simulation + ?Sized>(
    controller: &mut LoopController<ManualScheduler>,
    sim: &mut A,
    timestamp_ms: f64,
    summary: &mut RunSummary,
) {
    summary.refreshes += 1;
    summary.last_timestamp_ms = timestamp_ms;
    for token in controller.scheduler_mut().take_pending() {
        let outcome = controller.on_frame(token, timestamp_ms, sim);
        summary.record(&outcome);
    }
}

/// Drives the loop with a synthetic display clock, as fast as possible.
///
/// Refresh `n` is delivered at `start + n * interval` plus any stalls
/// injected before it. Deterministic: the same host, config and simulation
/// always produce the same run.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    refresh_interval_ms: f64,
    start_ms: f64,
    stalls: Vec<Stall>,
}

impl HeadlessHost {
    pub fn new(refresh_hz: f64) -> Result<Self> {
        Ok(Self {
            refresh_interval_ms: refresh_interval_ms(refresh_hz)?,
            start_ms: 0.0,
            stalls: Vec::new(),
        })
    }

    /// Timestamp of the first refresh
    pub fn starting_at(mut self, start_ms: f64) -> Self {
        self.start_ms = start_ms;
        self
    }

    pub fn with_stall(mut self, stall: Stall) -> Self {
        self.stalls.push(stall);
        self
    }

    pub fn refresh_interval_ms(&self) -> f64 {
        self.refresh_interval_ms
    }

    /// Deliver up to `refreshes` display refreshes.
    ///
    /// Returns early once the controller has nothing pending (never started,
    /// or stopped by the simulation).
    pub fn run<A: Simulation + ?Sized>(
        &self,
        controller: &mut LoopController<ManualScheduler>,
        sim: &mut A,
        refreshes: u64,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut stalled_ms = 0.0;

        for refresh in 0..refreshes {
            if !controller.scheduler().has_pending() {
                break;
            }

            stalled_ms += self
                .stalls
                .iter()
                .filter(|s| s.at_refresh == refresh)
                .map(|s| s.duration_ms)
                .sum::<f64>();
            let timestamp_ms =
                self.start_ms + refresh as f64 * self.refresh_interval_ms + stalled_ms;

            deliver(controller, sim, timestamp_ms, &mut summary);
        }

        summary
    }
}

/// Drives the loop from the wall clock, sleeping until each refresh is due
#[derive(Debug, Clone)]
pub struct RealtimeHost {
    refresh_interval: Duration,
}

impl RealtimeHost {
    pub fn new(refresh_hz: f64) -> Result<Self> {
        let interval_ms = refresh_interval_ms(refresh_hz)?;
        Ok(Self {
            refresh_interval: Duration::from_secs_f64(interval_ms / 1000.0),
        })
    }

    /// Run until `duration` of wall time has passed or nothing is pending
    pub fn run<A: Simulation + ?Sized>(
        &self,
        controller: &mut LoopController<ManualScheduler>,
        sim: &mut A,
        duration: Duration,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        let origin = Instant::now();
        let mut next_refresh = origin;

        while origin.elapsed() < duration && controller.scheduler().has_pending() {
            let timestamp_ms = origin.elapsed().as_secs_f64() * 1000.0;
            deliver(controller, sim, timestamp_ms, &mut summary);

            next_refresh += self.refresh_interval;
            let now = Instant::now();
            if next_refresh > now {
                std::thread::sleep(next_refresh - now);
            } else {
                // fell behind; don't try to replay missed refreshes
                next_refresh = now;
            }
        }

        summary
    }
}
