//! PostgreSQL pool settings.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const POOL_CEILING: u32 = 100;

/// Connection pool for the conversation store.
///
/// `url` has no default; every other field does.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "DatabaseConfig::default_min")]
    pub min_connections: u32,

    #[serde(default = "DatabaseConfig::default_max")]
    pub max_connections: u32,

    #[serde(default = "DatabaseConfig::default_acquire_secs")]
    pub acquire_timeout_secs: u64,

    /// Apply `migrations/` before serving.
    #[serde(default = "DatabaseConfig::default_migrate")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    fn default_min() -> u32 {
        1
    }

    fn default_max() -> u32 {
        10
    }

    fn default_acquire_secs() -> u64 {
        30
    }

    fn default_migrate() -> bool {
        true
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE_URL"));
        }
        let scheme_ok = ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme));
        if !scheme_ok {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > POOL_CEILING {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: Self::default_min(),
            max_connections: Self::default_max(),
            acquire_timeout_secs: Self::default_acquire_secs(),
            run_migrations: Self::default_migrate(),
        }
    }
}
