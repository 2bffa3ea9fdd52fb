//! Typed settings read from the environment.
//!
//! Every key lives under the `LEAD_QUALIFIER` prefix and nested sections are
//! joined with `__`, so `LEAD_QUALIFIER__FUNNEL__SESSION_TIMEOUT_MINUTES=45`
//! sets `funnel.session_timeout_minutes`. A `.env` file is honoured when
//! present.
//!
//! ```no_run
//! use lead_qualifier::config::AppConfig;
//!
//! let config = AppConfig::load().expect("configuration");
//! config.validate().expect("valid configuration");
//! ```

mod ai;
mod database;
mod error;
mod funnel;
mod server;
mod vector_index;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use funnel::FunnelConfig;
pub use server::{Environment, ServerConfig};
pub use vector_index::VectorIndexConfig;

use serde::Deserialize;

const ENV_PREFIX: &str = "LEAD_QUALIFIER";

/// Everything the service needs at startup.
///
/// Only `database.url` and `ai.openai_api_key` lack defaults; the latter is
/// enforced by [`AppConfig::validate`] rather than at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// Chat and embedding models.
    #[serde(default)]
    pub ai: AiConfig,

    /// Hosted index for reason classification. Optional.
    #[serde(default)]
    pub vector_index: VectorIndexConfig,

    #[serde(default)]
    pub funnel: FunnelConfig,
}

impl AppConfig {
    /// Reads `.env` (if any) and then the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::LoadError`] when a required key is missing or a value
    /// does not parse into its field type.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let source = config::Environment::default()
            .prefix(ENV_PREFIX)
            .separator("__");

        Ok(config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?)
    }

    /// Runs each section's checks, stopping at the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.ai.validate()?;
        self.vector_index.validate()?;
        self.funnel.validate()
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
