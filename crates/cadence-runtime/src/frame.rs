//! Per-step and per-frame data handed to the simulation

/// One fixed simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Simulated time this step advances, always the configured timestep
    pub delta_ms: f64,
    /// Zero-based index of this step within the current display frame
    pub index: u32,
}

/// Everything a draw needs to know about the frame being displayed.
///
/// Valid for the duration of one `draw` call. The interpolation fraction is
/// computed after every step of the frame has run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// How far between the last two simulated states to render, normally in `[0, 1)`.
    /// The synthetic first frame uses `1.0`.
    pub interpolation: f64,
    /// The fixed delta used by the steps that just ran
    pub simulation_timestep_ms: f64,
    /// Host timestamp of this refresh
    pub timestamp_ms: f64,
    /// Number of fixed steps run for this frame
    pub steps: u32,
    /// Smoothed frames-per-second estimate
    pub fps: f64,
}

impl FrameContext {
    /// Blend a previous and current simulated value by the interpolation fraction
    pub fn lerp(&self, previous: f64, current: f64) -> f64 {
        previous + (current - previous) * self.interpolation
    }

    /// True for the settled frame drawn when the loop starts
    pub fn is_first_frame(&self) -> bool {
        self.steps == 0 && self.interpolation == 1.0
    }
}
