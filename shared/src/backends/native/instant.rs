use std::time::Duration;

/// Monotonic point in time. Everything time-dependent in the sync core takes
/// `now` as an argument so tests can step the clock by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    inner: std::time::Instant,
}

impl Instant {
    pub fn now() -> Self {
        Self {
            inner: std::time::Instant::now(),
        }
    }

    /// Time elapsed between `self` and `now`, zero if `now` is earlier
    pub fn elapsed(&self, now: &Instant) -> Duration {
        now.inner.saturating_duration_since(self.inner)
    }

    pub fn add_duration(&mut self, duration: Duration) {
        self.inner += duration;
    }

    /// Returns a copy of `self` moved forward by `duration`
    pub fn plus(&self, duration: Duration) -> Instant {
        let mut output = *self;
        output.add_duration(duration);
        output
    }

    pub fn is_after(&self, other: &Instant) -> bool {
        self.inner > other.inner
    }
}
