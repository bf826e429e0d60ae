//! Bounded queue of loop notifications

use crate::event::LoopEvent;
use std::collections::VecDeque;

/// Events kept when nobody drains the bus
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Queue the controller pushes to and hosts drain.
///
/// The loop may run indefinitely without anyone draining, so the bus never
/// grows past its capacity: only the newest `FpsUpdated` is kept, and once
/// full the oldest event is dropped to make room.
#[derive(Debug)]
pub struct EventBus {
    events: VecDeque<LoopEvent>,
    capacity: usize,
    dropped: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// A bus holding at most `capacity` events (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: LoopEvent) {
        if matches!(event, LoopEvent::FpsUpdated { .. }) {
            self.events
                .retain(|e| !matches!(e, LoopEvent::FpsUpdated { .. }));
        }

        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> Vec<LoopEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events evicted because the bus was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
