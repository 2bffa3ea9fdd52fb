//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid URL for {0}: must start with http:// or https://")]
    InvalidUrl(&'static str),

    #[error("Temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("Invalid vector dimension")]
    InvalidDimension,

    #[error("Session timeout must be between one minute and one week")]
    InvalidSessionTimeout,

    #[error("Qualification threshold must be between 0.0 and 1.0")]
    InvalidThreshold,
}
