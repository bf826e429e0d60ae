//! The host's frame-scheduling primitive

/// Handle for one requested display callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(u64);

impl FrameToken {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Requests callbacks on the host's next display refresh.
///
/// The host answers a request by calling
/// [`LoopController::on_frame`](crate::LoopController::on_frame) with the
/// returned token and the refresh timestamp in milliseconds. Timestamps must
/// be monotonically increasing.
pub trait FrameScheduler {
    /// Ask for a callback on the next display refresh
    fn schedule_next(&mut self) -> FrameToken;

    /// Withdraw a pending request. Unknown or already-fired tokens are ignored.
    fn cancel(&mut self, token: FrameToken);
}

/// A scheduler that only records requests.
///
/// Whoever owns the display clock takes the pending tokens at each refresh
/// and delivers them with a timestamp. Used by the headless and real-time
/// hosts, and by tests that drive the loop with synthetic timestamps.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pending: Vec<FrameToken>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every request made before this refresh, in request order
    pub fn take_pending(&mut self) -> Vec<FrameToken> {
        std::mem::take(&mut self.pending)
    }

    /// Tokens waiting for the next refresh
    pub fn pending(&self) -> &[FrameToken] {
        &self.pending
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Total number of callbacks requested so far
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total number of pending callbacks withdrawn so far
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule_next(&mut self) -> FrameToken {
        self.next += 1;
        self.requested += 1;
        let token = FrameToken(self.next);
        self.pending.push(token);
        token
    }

    fn cancel(&mut self, token: FrameToken) {
        let before = self.pending.len();
        self.pending.retain(|t| *t != token);
        if self.pending.len() < before {
            self.cancelled += 1;
        }
    }
}
