//! Loop lifecycle events

/// Notifications emitted by the loop controller
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    /// The first frame was drawn and the loop is now running
    Started { timestamp_ms: f64 },
    /// The loop was stopped and its pending frame cancelled
    Stopped,
    /// The catch-up cap was hit and the remaining time debt was dropped
    Stalled { steps: u32, discarded_ms: f64 },
    /// The smoothed FPS estimate was recomputed
    FpsUpdated { fps: f64 },
}
