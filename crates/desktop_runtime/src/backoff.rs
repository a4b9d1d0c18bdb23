//! Reconnect delay policy shared by the browser and native hosts.

use std::time::Duration;

/// Delay before the first reconnect attempt.
pub const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
/// Upper bound for the reconnect delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Capped exponential reconnect delay.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(INITIAL_BACKOFF, MAX_BACKOFF)
    }
}

impl Backoff {
    /// Creates a backoff starting at `initial` and never exceeding `max`.
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Returns the next delay and doubles the following one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    /// Restarts from the initial delay after a successful connect.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}
