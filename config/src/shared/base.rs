use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// TLS is enabled but no trusted root certificates are provided.
    #[error("Invalid TLS config: `trusted_root_certs` must be set when `enabled` is true")]
    MissingTrustedRootCerts,
    /// The lock registry catalog name is empty.
    #[error("`semaphore.catalog` cannot be empty")]
    EmptyCatalog,
    /// The poll interval is zero, which would turn the lock check into a busy loop.
    #[error("`semaphore.poll.interval_ms` cannot be zero")]
    PollIntervalZero,
    /// The backoff factor is below one or not finite.
    #[error("`semaphore.poll.backoff_factor` must be a finite number >= 1.0, got {0}")]
    InvalidBackoffFactor(f64),
    /// The maximum poll interval is lower than the initial one.
    #[error("`semaphore.poll.max_interval_ms` ({max}) cannot be lower than `interval_ms` ({initial})")]
    MaxIntervalBelowInterval { initial: u64, max: u64 },
    /// A bounded poll policy allows zero polls.
    #[error("`semaphore.poll.max_attempts` cannot be zero")]
    MaxAttemptsZero,
}
