//! Trailing-edge debounce for bursty inputs such as window resizes.

use std::time::{Duration, Instant};

/// Delay applied to surface resizes.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);

/// Holds the latest value until no new value has arrived for the debounce duration.
///
/// Poll-driven: call [`Debouncer::poll`] each frame.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    pending: Option<T>,
    last_event: Option<Instant>,
    debounce_duration: Duration,
}

impl<T> Debouncer<T> {
    pub fn new(debounce_duration: Duration) -> Self {
        Self {
            pending: None,
            last_event: None,
            debounce_duration,
        }
    }

    pub fn set_debounce(&mut self, duration: Duration) {
        self.debounce_duration = duration;
    }

    pub fn debounce_duration(&self) -> Duration {
        self.debounce_duration
    }

    /// Replace the pending value and restart the quiet period.
    pub fn schedule(&mut self, value: T) {
        self.schedule_at(value, Instant::now());
    }

    pub fn schedule_at(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        self.last_event = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending value if the quiet period has passed.
    pub fn poll(&mut self) -> Option<T> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        let last = self.last_event?;
        if now.saturating_duration_since(last) < self.debounce_duration {
            return None;
        }
        self.last_event = None;
        self.pending.take()
    }

    /// Release the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.last_event = None;
        self.pending.take()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE)
    }
}
