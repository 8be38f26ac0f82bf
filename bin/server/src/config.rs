//! Centralized server configuration.
//!
//! Strongly-typed configuration for the server binary, loaded via the
//! `config` crate from environment variables. Nested keys use a double
//! underscore, so `RELAY__UPSTREAM__API_KEY` sets the upstream credential.

use prompt_relay_gateway::RelayConfig;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Gateway pipeline configuration.
    #[serde(default)]
    pub relay: RelayConfig,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            relay: RelayConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured value cannot be parsed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
