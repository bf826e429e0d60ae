//! Demo world driven by `cadence run`
//!
//! Bodies drift and bounce inside a box; oscillators swing on a sine. Both
//! keep their previous state so the renderer can interpolate between steps.

use cadence_core::{EntityId, Result};
use cadence_ecs::{Component, World};
use cadence_runtime::{FrameContext, RuntimeSystem};
use serde::Serialize;
use std::fmt::Write;

/// Half-width of the square the bodies bounce in
pub const BOUNDS: f64 = 100.0;

/// A point moving at constant velocity, reflected at the bounds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Body {
    pub previous: [f64; 2],
    pub position: [f64; 2],
    /// Units per second
    pub velocity: [f64; 2],
}

impl Body {
    pub fn new(position: [f64; 2], velocity: [f64; 2]) -> Self {
        Self {
            previous: position,
            position,
            velocity,
        }
    }

    pub fn interpolated(&self, frame: &FrameContext) -> [f64; 2] {
        [
            frame.lerp(self.previous[0], self.position[0]),
            frame.lerp(self.previous[1], self.position[1]),
        ]
    }
}

impl Component for Body {
    fn update(&mut self, delta_ms: f64) {
        self.previous = self.position;
        let dt = delta_ms / 1000.0;
        for axis in 0..2 {
            let mut p = self.position[axis] + self.velocity[axis] * dt;
            if p > BOUNDS {
                p = 2.0 * BOUNDS - p;
                self.velocity[axis] = -self.velocity[axis];
            } else if p < -BOUNDS {
                p = -2.0 * BOUNDS - p;
                self.velocity[axis] = -self.velocity[axis];
            }
            self.position[axis] = p;
        }
    }
}

/// A value swinging as `amplitude * sin(phase)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Oscillator {
    pub amplitude: f64,
    /// Cycles per second
    pub frequency_hz: f64,
    pub phase: f64,
    pub previous: f64,
    pub value: f64,
}

impl Oscillator {
    pub fn new(amplitude: f64, frequency_hz: f64) -> Self {
        Self {
            amplitude,
            frequency_hz,
            phase: 0.0,
            previous: 0.0,
            value: 0.0,
        }
    }
}

impl Component for Oscillator {
    fn update(&mut self, delta_ms: f64) {
        self.previous = self.value;
        self.phase = (self.phase + std::f64::consts::TAU * self.frequency_hz * delta_ms / 1000.0)
            % std::f64::consts::TAU;
        self.value = self.amplitude * self.phase.sin();
    }

    fn on_attach(&mut self, owner: EntityId) {
        log::debug!("Oscillator attached to entity {}", owner);
    }
}

/// Build a world of `count` named entities, each with a body; every other
/// entity also carries an oscillator.
pub fn build_world(count: usize) -> Result<World> {
    let mut world = World::new();
    for i in 0..count {
        let id = world.spawn_named(format!("body_{}", i))?;
        let angle = i as f64 * 0.7;
        let speed = 20.0 + 5.0 * i as f64;
        world.attach(
            id,
            Body::new(
                [0.0, 0.0],
                [speed * angle.cos(), speed * angle.sin()],
            ),
        )?;
        if i % 2 == 0 {
            world.attach(id, Oscillator::new(10.0, 0.5 + 0.25 * i as f64))?;
        }
    }
    Ok(world)
}

/// Text snapshot of every body and oscillator at the frame's interpolation
pub fn render_frame(world: &World, frame: &FrameContext) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "t={:.1}ms steps={} alpha={:.3} fps={:.1}",
        frame.timestamp_ms, frame.steps, frame.interpolation, frame.fps
    );
    world.for_each::<Body>(|id, body| {
        let [x, y] = body.interpolated(frame);
        let name = world.get_name(id).unwrap_or("?").to_string();
        let _ = writeln!(out, "  {:<8} ({:>8.2}, {:>8.2})", name, x, y);
    });
    world.for_each::<Oscillator>(|id, osc| {
        let name = world.get_name(id).unwrap_or("?").to_string();
        let _ = writeln!(
            out,
            "  {:<8} ~ {:>7.3}",
            name,
            frame.lerp(osc.previous, osc.value)
        );
    });
    out
}

/// Prints a snapshot every `every` drawn frames
pub struct TextRenderer {
    every: u64,
    drawn: u64,
}

impl TextRenderer {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            drawn: 0,
        }
    }

    pub fn frames_drawn(&self) -> u64 {
        self.drawn
    }
}

impl RuntimeSystem for TextRenderer {
    fn draw(&mut self, world: &World, frame: &FrameContext) -> Result<()> {
        if self.drawn % self.every == 0 {
            print!("{}", render_frame(world, frame));
        }
        self.drawn += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "text_renderer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(interpolation: f64) -> FrameContext {
        FrameContext {
            interpolation,
            simulation_timestep_ms: 100.0,
            timestamp_ms: 0.0,
            steps: 1,
            fps: 60.0,
        }
    }

    #[test]
    fn test_body_moves_and_bounces() {
        let mut body = Body::new([95.0, 0.0], [100.0, -10.0]);
        body.update(100.0);
        assert_eq!(body.previous, [95.0, 0.0]);
        assert!((body.position[0] - 95.0).abs() < 1e-9);
        assert!((body.position[1] + 1.0).abs() < 1e-9);
        assert_eq!(body.velocity, [-100.0, -10.0]);
    }

    #[test]
    fn test_body_interpolation() {
        let mut body = Body::new([0.0, 0.0], [10.0, 20.0]);
        body.update(1000.0);
        let [x, y] = body.interpolated(&frame(0.5));
        assert!((x - 5.0).abs() < 1e-9);
        assert!((y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_oscillator_quarter_cycle() {
        let mut osc = Oscillator::new(2.0, 1.0);
        osc.update(250.0);
        assert!((osc.value - 2.0).abs() < 1e-9);
        assert_eq!(osc.previous, 0.0);
    }

    #[test]
    fn test_build_world() {
        let world = build_world(5).unwrap();
        assert_eq!(world.entity_count(), 5);
        assert_eq!(world.entities_with::<Body>().len(), 5);
        assert_eq!(world.entities_with::<Oscillator>().len(), 3);
        assert!(world.contains_name("body_4"));
    }

    #[test]
    fn test_render_frame_lists_everything() {
        let world = build_world(2).unwrap();
        let text = render_frame(&world, &frame(1.0));
        assert!(text.starts_with("t=0.0ms steps=1"));
        assert!(text.contains("body_0"));
        assert!(text.contains("body_1"));
        assert_eq!(text.lines().count(), 1 + 2 + 1);
    }

    #[test]
    fn test_renderer_counts_frames() {
        let world = build_world(1).unwrap();
        let mut renderer = TextRenderer::new(0);
        for _ in 0..3 {
            renderer.draw(&world, &frame(0.0)).unwrap();
        }
        assert_eq!(renderer.frames_drawn(), 3);
    }
}
