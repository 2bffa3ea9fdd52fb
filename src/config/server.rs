//! HTTP listener settings.

use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

use super::error::ValidationError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_FILTER: &str = "info,lead_qualifier=debug,sqlx=warn";

/// Where the webhook API listens and how it logs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Comma-separated allow list. Unset means any origin.
    pub cors_origins: Option<String>,
}

/// Deployment environment. Production switches logs to JSON.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        let Some(raw) = self.cors_origins.as_deref() else {
            return Vec::new();
        };
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            environment: Environment::default(),
            log_level: DEFAULT_LOG_FILTER.to_string(),
            cors_origins: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unparsable_host_is_an_error() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn blank_cors_entries_are_dropped() {
        let config = ServerConfig {
            cors_origins: Some("https://crm.example.com, ,https://painel.example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.cors_origins_list(),
            vec!["https://crm.example.com", "https://painel.example.com"]
        );
        assert!(ServerConfig::default().cors_origins_list().is_empty());
    }

    #[test]
    fn port_zero_is_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));
    }
}
