//! Configuration management for the Total Evolve backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: TE__)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Local settings storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON settings file
    pub path: String,
}

/// Which health-data service to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthProvider {
    #[default]
    Memory,
    Bridge,
}

/// Health-data service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    pub provider: HealthProvider,
    /// JSON samples loaded by the in-memory provider
    pub fixture_path: Option<String>,
    pub bridge_url: Option<String>,
    pub bridge_token: Option<String>,
    pub request_timeout_secs: u64,
    /// Abort a metric's in-flight fetch when a newer one starts
    pub cancel_superseded_fetches: bool,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            provider: HealthProvider::Memory,
            fixture_path: None,
            bridge_url: None,
            bridge_token: None,
            request_timeout_secs: 10,
            cancel_superseded_fetches: true,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            storage: StorageConfig {
                path: "data/settings.json".to_string(),
            },
            health: HealthConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with TE__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (TE__ prefix)
            // e.g., TE__SERVER__PORT=9000 sets server.port
            .add_source(config::Environment::with_prefix("TE").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }

    /// Check settings that cannot work together
    pub fn validate(&self) -> Result<()> {
        if self.health.provider == HealthProvider::Bridge && self.health.bridge_url.is_none() {
            anyhow::bail!("health.bridge_url must be set when health.provider = \"bridge\"");
        }
        if self.health.request_timeout_secs == 0 {
            anyhow::bail!("health.request_timeout_secs must be greater than 0");
        }
        if self.storage.path.trim().is_empty() {
            anyhow::bail!("storage.path must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.health.provider, HealthProvider::Memory);
        assert!(config.health.cancel_superseded_fetches);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_production() {
        // Default should be false (development)
        assert!(!AppConfig::is_production());
    }

    #[test]
    fn test_bridge_requires_url() {
        let mut config = AppConfig::default();
        config.health.provider = HealthProvider::Bridge;
        assert!(config.validate().is_err());

        config.health.bridge_url = Some("http://127.0.0.1:7070".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_provider_parses_lowercase() {
        let provider: HealthProvider = serde_json::from_str("\"bridge\"").unwrap();
        assert_eq!(provider, HealthProvider::Bridge);
    }
}
