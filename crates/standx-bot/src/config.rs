//! Application configuration.
//!
//! Endpoints and trading parameters come from a TOML file; credentials
//! come from the environment only and are never written to disk.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use standx_engine::MakerConfig;
use std::path::Path;

/// Environment variable holding the REST API bearer token.
pub const ENV_API_TOKEN: &str = "STANDX_API_TOKEN";
/// Environment variable holding the ed25519 signing key (base58 or base64).
pub const ENV_SIGNING_KEY: &str = "STANDX_SIGNING_KEY";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Trading REST endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Geo service endpoint used for clock synchronization.
    #[serde(default = "default_geo_url")]
    pub geo_url: String,

    /// Maker engine parameters.
    #[serde(default)]
    pub maker: MakerConfig,
}

fn default_base_url() -> String {
    "https://perps.standx.com".to_string()
}

fn default_geo_url() -> String {
    "https://geo.standx.com".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            geo_url: default_geo_url(),
            maker: MakerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Resolve the config path (explicit override, then `STANDX_CONFIG`,
    /// then the default path) and load it, falling back to defaults when
    /// no file exists.
    pub fn load(path_override: Option<&str>) -> AppResult<Self> {
        let config_path = path_override
            .map(str::to_string)
            .or_else(|| std::env::var("STANDX_CONFIG").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            tracing::info!(path = %config_path, "Loading configuration");
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}

/// Credentials pulled from the environment at startup.
#[derive(Clone)]
pub struct Secrets {
    pub api_token: String,
    pub signing_key: String,
}

impl Secrets {
    pub fn from_env() -> AppResult<Self> {
        let api_token = std::env::var(ENV_API_TOKEN)
            .map_err(|_| AppError::Config(format!("{ENV_API_TOKEN} is not set")))?;
        let signing_key = std::env::var(ENV_SIGNING_KEY)
            .map_err(|_| AppError::Config(format!("{ENV_SIGNING_KEY} is not set")))?;

        Ok(Self {
            api_token,
            signing_key,
        })
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_token", &"<redacted>")
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.base_url, "https://perps.standx.com");
        assert_eq!(config.geo_url, "https://geo.standx.com");
        assert_eq!(config.maker.symbol, "BTC-USD");
    }

    #[test]
    fn maker_section_overrides_defaults() {
        let toml_str = r#"
            base_url = "https://example.test"

            [maker]
            symbol = "ETH-USD"
            order_notional = 500
            side = "both"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.maker.symbol, "ETH-USD");
        assert_eq!(config.maker.order_notional, dec!(500));
        // Unspecified maker fields keep their defaults.
        assert_eq!(config.maker.poll_interval_ms, 500);
    }

    #[test]
    fn load_falls_back_to_defaults_when_file_missing() {
        let config = AppConfig::load(Some("/nonexistent/standx.toml")).unwrap();
        assert_eq!(config.base_url, "https://perps.standx.com");
    }

    #[test]
    fn secrets_debug_redacts_values() {
        let secrets = Secrets {
            api_token: "super-secret-token".to_string(),
            signing_key: "super-secret-key".to_string(),
        };
        let debug = format!("{secrets:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
