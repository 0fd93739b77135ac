use std::time::Duration;

use super::Instant;

/// A Timer with a given duration, which can be polled to see whether it has
/// rung since its last reset
pub struct Timer {
    duration: Duration,
    last: Instant,
}

impl Timer {
    /// Creates a new Timer, treated as having just been reset at `now`
    pub fn new(duration: Duration, now: &Instant) -> Self {
        Timer {
            duration,
            last: *now,
        }
    }

    /// Reset the Timer to start again
    pub fn reset(&mut self, now: &Instant) {
        self.last = *now;
    }

    /// Returns whether `duration` has passed since the last reset
    pub fn ringing(&self, now: &Instant) -> bool {
        self.last.elapsed(now) >= self.duration
    }

    /// Returns true and resets if ringing
    pub fn ring_and_reset(&mut self, now: &Instant) -> bool {
        if self.ringing(now) {
            self.reset(now);
            true
        } else {
            false
        }
    }
}
