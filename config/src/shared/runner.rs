use serde::Deserialize;

use crate::Config;
use crate::environment::Environment;
use crate::shared::{PgConnectionConfig, SemaphoreConfig, ValidationError};

const fn default_max_connections() -> u32 {
    2
}

/// Complete configuration of the `runner` binary.
///
/// This intentionally does not implement `Serialize` to avoid leaking the reference
/// database password.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Connection to the Postgres reference database hosting the lock registry.
    pub reference_db: PgConnectionConfig,
    /// Maximum connections kept by the reference database pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    pub semaphore: SemaphoreConfig,
    /// Set from `APP_ENVIRONMENT` after loading, never read from configuration files.
    #[serde(skip, default = "default_environment")]
    pub environment: Environment,
}

fn default_environment() -> Environment {
    Environment::Dev
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.reference_db.validate()?;
        self.semaphore.validate()
    }
}

impl Config for RunnerConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_runner_config() {
        let config: RunnerConfig = serde_json::from_str(
            r#"{
                "reference_db": {
                    "host": "localhost",
                    "port": 5432,
                    "name": "cdl_tp_dev",
                    "username": "pipeline",
                    "password": "secret"
                },
                "semaphore": {
                    "catalog": "cdl_tp_dev",
                    "poll": { "interval_ms": 500, "max_attempts": 3 }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.max_connections, 2);
        assert_eq!(config.environment, Environment::Dev);
        assert_eq!(config.semaphore.poll.interval_ms, 500);
        assert_eq!(config.semaphore.poll.max_attempts, Some(3));
        assert!(!config.reference_db.tls.enabled);
        assert_eq!(config.validate(), Ok(()));
    }
}
