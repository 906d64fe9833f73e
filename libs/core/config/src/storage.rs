use std::fmt;
use std::str::FromStr;

use crate::{env_or_default, ConfigError, FromEnv};

/// Backing store for the user repositories, chosen with `STORAGE_ENGINE`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageEngine {
    #[default]
    MongoDb,
    Postgres,
    /// Process-local maps; nothing survives a restart.
    Memory,
}

impl StorageEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageEngine::MongoDb => "mongodb",
            StorageEngine::Postgres => "postgresql",
            StorageEngine::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageEngine {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StorageEngine::MongoDb),
            "postgresql" | "postgres" => Ok(StorageEngine::Postgres),
            "memory" => Ok(StorageEngine::Memory),
            other => Err(ConfigError::ParseError {
                key: "STORAGE_ENGINE".to_string(),
                details: format!(
                    "unknown storage engine '{}', expected mongodb, postgresql or memory",
                    other
                ),
            }),
        }
    }
}

impl FromEnv for StorageEngine {
    /// Reads STORAGE_ENGINE (default: mongodb)
    fn from_env() -> Result<Self, ConfigError> {
        env_or_default("STORAGE_ENGINE", "mongodb").parse()
    }
}
