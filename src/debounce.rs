//! Trailing-edge debounce driven by the event loop clock.
//!
//! A value handed to [`Debouncer::set`] becomes visible through
//! [`Debouncer::value`] only after it has gone `delay` without being
//! replaced. There is at most one pending value; setting a new one drops
//! the previous one and restarts the timer.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    value: T,
    pending: Option<(T, Instant)>,
    delay: Duration,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            value: initial,
            pending: None,
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The last committed value.
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(v, _)| v)
    }

    /// When the pending value will commit, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn set(&mut self, value: T) {
        self.set_at(value, Instant::now());
    }

    pub fn set_at(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// Commit the pending value if its deadline has passed.
    /// Returns `true` when the committed value changed.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        match self.pending.take() {
            Some((v, at)) if now >= at => {
                let changed = v != self.value;
                self.value = v;
                changed
            }
            other => {
                self.pending = other;
                false
            }
        }
    }

    /// Commit immediately, dropping any pending value.
    pub fn reset(&mut self, value: T) {
        self.pending = None;
        self.value = value;
    }
}
