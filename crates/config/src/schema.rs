//! Config schema types (gateway connection, relational store).

use serde::{Deserialize, Serialize};

/// Gateway URL used when neither the config file nor the environment sets
/// one.
pub const DEFAULT_GATEWAY_URL: &str = "ws://localhost:3001";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PonteConfig {
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
}

/// Upstream gateway connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// WebSocket URL of the bot gateway.
    pub url: String,

    /// Bearer token injected during the handshake. Empty means the upstream
    /// runs without auth.
    pub token: String,
}

/// Relational store settings. Persistence is disabled when no URL is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite://ponte.db?mode=rwc`.
    pub url: Option<String>,
}

impl PonteConfig {
    /// Fill values the file left unset from `PONTE_*` environment variables,
    /// then apply built-in defaults. File values always win; the environment
    /// is a fallback, not an override.
    pub fn apply_env_fallback(&mut self) {
        if self.gateway.url.is_empty()
            && let Ok(url) = std::env::var("PONTE_GATEWAY_URL")
        {
            self.gateway.url = url;
        }
        if self.gateway.token.is_empty()
            && let Ok(token) = std::env::var("PONTE_GATEWAY_TOKEN")
        {
            self.gateway.token = token;
        }
        if self.database.url.is_none()
            && let Ok(url) = std::env::var("PONTE_DATABASE_URL")
        {
            self.database.url = Some(url);
        }

        if self.gateway.url.is_empty() {
            self.gateway.url = DEFAULT_GATEWAY_URL.to_string();
        }
    }
}

#[cfg(test)]
// set_var is unsafe in edition 2024; fine in serialized single-threaded tests.
#[allow(unsafe_code)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn defaults_kick_in_without_file_or_env() {
        let mut config = PonteConfig::default();
        config.apply_env_fallback();
        assert_eq!(config.gateway.url, DEFAULT_GATEWAY_URL);
        assert!(config.gateway.token.is_empty());
        assert!(config.database.url.is_none());
    }

    #[test]
    #[serial]
    fn file_values_beat_the_environment() {
        unsafe { std::env::set_var("PONTE_GATEWAY_URL", "ws://from-env:1") };
        let mut config = PonteConfig {
            gateway: GatewayConfig {
                url: "ws://from-file:2".into(),
                token: String::new(),
            },
            ..PonteConfig::default()
        };
        config.apply_env_fallback();
        assert_eq!(config.gateway.url, "ws://from-file:2");
        unsafe { std::env::remove_var("PONTE_GATEWAY_URL") };
    }

    #[test]
    #[serial]
    fn environment_fills_unset_values() {
        unsafe { std::env::set_var("PONTE_DATABASE_URL", "sqlite://env.db") };
        let mut config = PonteConfig::default();
        config.apply_env_fallback();
        assert_eq!(config.database.url.as_deref(), Some("sqlite://env.db"));
        unsafe { std::env::remove_var("PONTE_DATABASE_URL") };
    }
}
