//! Configuration for the users CLI

use std::time::Duration;

use core_config::storage::StorageEngine;
use core_config::{ConfigError, Environment, FromEnv, env_parse_or_default};

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub storage: StorageEngine,
    /// Deadline applied to every command or query
    pub request_timeout: Duration,
}

impl FromEnv for Config {
    /// Reads APP_ENV, STORAGE_ENGINE and REQUEST_TIMEOUT_MS (default: 5000)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            environment: Environment::from_env(),
            storage: StorageEngine::from_env()?,
            request_timeout: Duration::from_millis(env_parse_or_default(
                "REQUEST_TIMEOUT_MS",
                5000u64,
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("APP_ENV", None::<&str>),
                ("STORAGE_ENGINE", None),
                ("REQUEST_TIMEOUT_MS", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.environment, Environment::Development);
                assert_eq!(config.storage, StorageEngine::MongoDb);
                assert_eq!(config.request_timeout, Duration::from_secs(5));
            },
        );
    }

    #[test]
    fn test_overrides() {
        temp_env::with_vars(
            [
                ("STORAGE_ENGINE", Some("memory")),
                ("REQUEST_TIMEOUT_MS", Some("750")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.storage, StorageEngine::Memory);
                assert_eq!(config.request_timeout, Duration::from_millis(750));
            },
        );
    }

    #[test]
    fn test_invalid_timeout() {
        temp_env::with_var("REQUEST_TIMEOUT_MS", Some("-1"), || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("REQUEST_TIMEOUT_MS"));
        });
    }
}
