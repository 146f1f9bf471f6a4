use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Default schema holding the lock registry table.
pub const DEFAULT_LOCK_SCHEMA: &str = "internal_tp";

/// Name of the lock registry table created by the registry migration.
pub const LOCK_TABLE: &str = "tp_run_lock_plc";

const fn default_interval_ms() -> u64 {
    10_000
}

const fn default_backoff_factor() -> f64 {
    1.0
}

fn default_lock_schema() -> String {
    DEFAULT_LOCK_SCHEMA.to_string()
}

/// Configuration of the run-coordination semaphore.
///
/// The registry table is always [`LOCK_TABLE`]; only its catalog and schema are configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct SemaphoreConfig {
    /// Catalog qualifying the lock registry table, e.g. `cdl_tp_dev`.
    pub catalog: String,
    #[serde(default = "default_lock_schema")]
    pub schema: String,
    /// How the lock checker waits for paths held by other runs.
    #[serde(default)]
    pub poll: PollConfig,
}

impl SemaphoreConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.catalog.trim().is_empty() {
            return Err(ValidationError::EmptyCatalog);
        }

        self.poll.validate()
    }
}

/// Poll policy of the lock checker.
///
/// With no `max_attempts` and no `deadline_ms` the checker waits forever for a held
/// path, matching how pipeline runs have always coordinated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PollConfig {
    /// Delay between the first and second poll.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Multiplier applied to the delay after each poll. `1.0` keeps it fixed.
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    /// Upper bound for the delay when backing off.
    #[serde(default)]
    pub max_interval_ms: Option<u64>,
    /// Maximum number of polls before giving up.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Maximum total wait before giving up.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            backoff_factor: default_backoff_factor(),
            max_interval_ms: None,
            max_attempts: None,
            deadline_ms: None,
        }
    }
}

impl PollConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_ms == 0 {
            return Err(ValidationError::PollIntervalZero);
        }

        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(ValidationError::InvalidBackoffFactor(self.backoff_factor));
        }

        if let Some(max) = self.max_interval_ms {
            if max < self.interval_ms {
                return Err(ValidationError::MaxIntervalBelowInterval {
                    initial: self.interval_ms,
                    max,
                });
            }
        }

        if self.max_attempts == Some(0) {
            return Err(ValidationError::MaxAttemptsZero);
        }

        Ok(())
    }

    /// Returns `true` when neither an attempt limit nor a deadline is set.
    pub fn is_unbounded(&self) -> bool {
        self.max_attempts.is_none() && self.deadline_ms.is_none()
    }
}
