//! Collapses bursts of resume signals into a single evaluation.
//!
//! The debouncer only tracks a deadline; the engine loop sleeps until it and
//! then calls [`Debouncer::fire`].

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Arm the timer, replacing any pending deadline. Returns `true` if a
    /// pending deadline was replaced.
    pub fn trigger(&mut self, now: Instant) -> bool {
        self.deadline.replace(now + self.window).is_some()
    }

    /// Drop the pending deadline, if any.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the deadline if it has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(150);

    #[tokio::test(start_paused = true)]
    async fn burst_restarts_the_window() {
        let mut deb = Debouncer::new(WINDOW);
        let t0 = Instant::now();

        assert!(!deb.trigger(t0));
        assert!(deb.trigger(t0 + Duration::from_millis(100)));

        // The first deadline has passed but was replaced.
        assert!(!deb.fire(t0 + Duration::from_millis(160)));
        assert!(deb.fire(t0 + Duration::from_millis(250)));
        assert!(!deb.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn fires_exactly_once() {
        let mut deb = Debouncer::new(WINDOW);
        let t0 = Instant::now();
        deb.trigger(t0);

        assert!(deb.fire(t0 + WINDOW));
        assert!(!deb.fire(t0 + WINDOW * 2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_clears_pending() {
        let mut deb = Debouncer::new(WINDOW);
        assert!(!deb.cancel());
        deb.trigger(Instant::now());
        assert!(deb.cancel());
        assert_eq!(deb.deadline(), None);
    }
}
