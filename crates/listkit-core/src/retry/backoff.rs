//! Backoff delay schedule.

use std::time::Duration;

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Every delay equals the initial delay
    Constant,
    /// Each delay doubles the previous one, capped at `max_delay`
    Exponential { max_delay: Duration },
}

/// Stateful delay generator for one retry sequence.
///
/// The first delay is the initial delay; with exponential backoff each later
/// delay is `min(previous * 2, max_delay)`. For an initial delay of 1s and a
/// cap of 60s that yields 1, 2, 4, 8, 16, 32, 60, 60, …
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    initial: Duration,
    policy: BackoffPolicy,
    previous: Option<Duration>,
}

impl BackoffSchedule {
    pub fn new(initial: Duration, policy: BackoffPolicy) -> Self {
        Self {
            initial,
            policy,
            previous: None,
        }
    }

    /// Delay to wait before the next attempt
    pub fn next_delay(&mut self) -> Duration {
        let delay = match (self.policy, self.previous) {
            (BackoffPolicy::Constant, _) => self.initial,
            (BackoffPolicy::Exponential { max_delay }, None) => self.initial.min(max_delay),
            (BackoffPolicy::Exponential { max_delay }, Some(prev)) => {
                prev.saturating_mul(2).min(max_delay)
            }
        };
        self.previous = Some(delay);
        delay
    }
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}
