use std::time::Duration;

use config::shared::PollConfig;

/// Delay between polls when nothing else is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How the lock checker waits for paths held by other runs.
///
/// The default polls every [`DEFAULT_POLL_INTERVAL`] forever.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub backoff_factor: f64,
    pub max_interval: Option<Duration>,
    pub max_attempts: Option<u32>,
    pub deadline: Option<Duration>,
}

impl PollPolicy {
    /// Polls every `interval` with no limit.
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            backoff_factor: 1.0,
            max_interval: None,
            max_attempts: None,
            deadline: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_backoff(mut self, factor: f64, max_interval: Option<Duration>) -> Self {
        self.backoff_factor = factor;
        self.max_interval = max_interval;
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_attempts.is_none() && self.deadline.is_none()
    }

    /// Returns the delay following `current`, capped at `max_interval`.
    ///
    /// Saturates at [`Duration::MAX`] when the product does not fit in a [`Duration`].
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next = if self.backoff_factor > 1.0 {
            Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_factor)
                .unwrap_or(Duration::MAX)
        } else {
            current
        };

        match self.max_interval {
            Some(max) => next.min(max),
            None => next,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::unbounded(DEFAULT_POLL_INTERVAL)
    }
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            backoff_factor: config.backoff_factor,
            max_interval: config.max_interval_ms.map(Duration::from_millis),
            max_attempts: config.max_attempts,
            deadline: config.deadline_ms.map(Duration::from_millis),
        }
    }
}
