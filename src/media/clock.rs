//! Wall-clock position for a stream that has nothing for the mixer to decode,
//! such as a picture-only video whose soundtrack ships as a separate file.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default)]
pub struct PictureClock {
    // Position accumulated up to the last pause or seek.
    base: Duration,
    running_since: Option<Instant>,
    total: Option<Duration>,
}

impl PictureClock {
    pub fn new(total: Option<Duration>) -> Self {
        Self {
            base: Duration::ZERO,
            running_since: None,
            total,
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        self.base = self.position(now);
        self.running_since = None;
    }

    /// Jump to `position`, keeping the running state.
    pub fn seek(&mut self, position: Duration, now: Instant) {
        self.base = self.clamp(position);
        if self.running_since.is_some() {
            self.running_since = Some(now);
        }
    }

    pub fn position(&self, now: Instant) -> Duration {
        let elapsed = self
            .running_since
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
        self.clamp(self.base + elapsed)
    }

    /// The clock reached the end of a stream with a known length.
    pub fn finished(&self, now: Instant) -> bool {
        self.total.is_some_and(|t| self.position(now) >= t)
    }

    fn clamp(&self, position: Duration) -> Duration {
        match self.total {
            Some(t) => position.min(t),
            None => position,
        }
    }
}
