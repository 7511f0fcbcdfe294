//! Exponential backoff for push-channel reconnection

use std::time::Duration;

/// Exponential backoff with jitter for reconnection attempts.
pub struct ExponentialBackoff {
    /// Initial delay, restored on reset
    initial: Duration,
    /// Current delay
    current: Duration,
    /// Maximum delay
    max: Duration,
    /// Multiplier
    multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    jitter: f64,
}

impl ExponentialBackoff {
    /// Create a new backoff with custom parameters.
    pub fn new(initial: Duration, max: Duration, multiplier: f64, jitter: f64) -> Self {
        Self {
            initial,
            current: initial,
            max,
            multiplier,
            jitter,
        }
    }

    /// The policy used for gateway reconnects: 1s doubling to a 60s cap,
    /// with a quarter of jitter.
    pub fn for_reconnect() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60), 2.0, 0.25)
    }

    /// Get the next delay and advance the backoff.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;

        // Calculate next delay with multiplier
        let next = Duration::from_secs_f64(self.current.as_secs_f64() * self.multiplier);
        self.current = std::cmp::min(next, self.max);

        // Add jitter
        let jitter_amount = delay.as_secs_f64() * self.jitter * rand::random::<f64>();
        delay + Duration::from_secs_f64(jitter_amount)
    }

    /// Reset after a successful handshake.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::for_reconnect()
    }
}
