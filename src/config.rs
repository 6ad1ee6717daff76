//! Process-wide relay configuration.
//!
//! Read once at startup from `GEMINI_*` environment variables and injected
//! into the relay. Nothing reads the environment at request time.

use std::{fmt, net::SocketAddr, time::Duration};

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::models::{
    KeyTransport, ModelParams, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_MODEL,
    DEFAULT_TIMEOUT,
};

/// Prefix shared by every configuration environment variable.
pub const ENV_PREFIX: &str = "GEMINI_";

/// Configuration of the relay and its upstream client.
#[derive(Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Upstream API key (`GEMINI_API_KEY`). Missing or empty means every
    /// request fails with a configuration error.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier (`GEMINI_MODEL`).
    pub model: String,
    /// Upstream base URL (`GEMINI_BASE_URL`).
    pub base_url: String,
    /// Upstream API version (`GEMINI_API_VERSION`).
    pub api_version: String,
    /// How the key is sent upstream (`GEMINI_KEY_TRANSPORT`, `header` or `query`).
    pub key_transport: KeyTransport,
    /// Upstream call timeout in seconds (`GEMINI_TIMEOUT_SECS`).
    pub timeout_secs: u64,
    /// Address the HTTP server listens on (`GEMINI_BIND_ADDR`).
    pub bind_addr: SocketAddr,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            key_transport: KeyTransport::default(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8888)),
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &self.api_key().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("key_transport", &self.key_transport)
            .field("timeout_secs", &self.timeout_secs)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl RelayConfig {
    /// Loads the configuration from defaults overlaid with `GEMINI_*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    /// The provider stack [`RelayConfig::from_env`] extracts from.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    /// Returns the configured API key, treating an empty value as missing.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    /// Parameters for the upstream [`crate::GenerativeModel`].
    pub fn model_params(&self) -> ModelParams {
        ModelParams::builder()
            .model(self.model.clone())
            .base_url(self.base_url.clone())
            .api_version(self.api_version.clone())
            .key_transport(self.key_transport)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_apply_without_environment() {
        Jail::expect_with(|_jail| {
            let config = RelayConfig::from_env()?;

            assert_eq!(config.api_key(), None);
            assert_eq!(config.model, "gemini-1.5-flash-latest");
            assert_eq!(config.key_transport, KeyTransport::Header);
            assert_eq!(config.timeout_secs, 30);
            assert_eq!(config.bind_addr.port(), 8888);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("GEMINI_API_KEY", "AIza-test");
            jail.set_env("GEMINI_MODEL", "gemini-2.0-flash");
            jail.set_env("GEMINI_KEY_TRANSPORT", "query");
            jail.set_env("GEMINI_TIMEOUT_SECS", "5");
            jail.set_env("GEMINI_BIND_ADDR", "127.0.0.1:3000");

            let config = RelayConfig::from_env()?;
            assert_eq!(config.api_key(), Some("AIza-test"));

            let params = config.model_params();
            assert_eq!(params.model, "gemini-2.0-flash");
            assert_eq!(params.key_transport, KeyTransport::Query);
            assert_eq!(params.timeout, Duration::from_secs(5));
            assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
            Ok(())
        });
    }

    #[test]
    fn empty_api_key_counts_as_missing() {
        Jail::expect_with(|jail| {
            jail.set_env("GEMINI_API_KEY", "");

            let config = RelayConfig::from_env()?;
            assert_eq!(config.api_key(), None);
            Ok(())
        });
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("GEMINI_TIMEOUT_SECS", "soon");

            assert!(RelayConfig::from_env().is_err());
            Ok(())
        });
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = RelayConfig {
            api_key: Some("AIza-secret".into()),
            ..RelayConfig::default()
        };

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("AIza-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
