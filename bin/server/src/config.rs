//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys
//! use `__` as separator, e.g. `SESSION__LIFETIME_MINUTES=30` or
//! `BIOMETRIC__ACCEPTANCE_THRESHOLD=55`.

use nexus_access_control::AccessConfig;
use nexus_biometric::MatcherConfig;
use serde::Deserialize;
use std::time::Duration;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Access evaluation configuration.
    #[serde(default)]
    pub access: AccessConfig,

    /// Fingerprint matcher tuning.
    #[serde(default)]
    pub biometric: MatcherConfig,
}

fn default_port() -> u16 {
    8080
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in minutes. Also the sweep interval.
    #[serde(default = "default_lifetime_minutes")]
    pub lifetime_minutes: u64,
}

fn default_lifetime_minutes() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_minutes: default_lifetime_minutes(),
        }
    }
}

impl SessionConfig {
    /// Interval between expired session sweeps.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.lifetime_minutes.max(1) * 60)
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(
            config::Environment::default()
                .separator("__")
                .try_parsing(true),
        )
    }

    fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        config::Environment::default()
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.lifetime_minutes, 60);
        assert_eq!(config.sweep_interval(), Duration::from_secs(3600));
    }

    #[test]
    fn loads_defaults_with_only_database_url() {
        let config = ServerConfig::from_source(environment(&[(
            "DATABASE_URL",
            "postgres://localhost/nexus",
        )]))
        .expect("config");

        assert_eq!(config.database_url, "postgres://localhost/nexus");
        assert_eq!(config.port, 8080);
        assert_eq!(config.session.lifetime_minutes, 60);
        assert!(config.access.log_unresolved_attempts);
        assert_eq!(config.biometric, MatcherConfig::default());
    }

    #[test]
    fn loads_nested_overrides() {
        let config = ServerConfig::from_source(environment(&[
            ("DATABASE_URL", "postgres://db/nexus"),
            ("PORT", "9000"),
            ("SESSION__LIFETIME_MINUTES", "15"),
            ("ACCESS__LOG_UNRESOLVED_ATTEMPTS", "false"),
            ("BIOMETRIC__ACCEPTANCE_THRESHOLD", "55"),
        ]))
        .expect("config");

        assert_eq!(config.port, 9000);
        assert_eq!(config.session.sweep_interval(), Duration::from_secs(900));
        assert!(!config.access.log_unresolved_attempts);
        assert_eq!(config.biometric.acceptance_threshold, 55.0);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(ServerConfig::from_source(environment(&[])).is_err());
    }
}
