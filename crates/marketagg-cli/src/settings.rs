//! Layered settings: defaults, then an optional TOML file, then
//! `MARKETAGG__`-prefixed environment variables.
//!
//! `MARKETAGG__SERVER__PORT=8081` sets `server.port`, and
//! `MARKETAGG__SERVER__CORS_ORIGINS=https://a.example,https://b.example`
//! sets the CORS allow-list.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use marketagg_core::{CachePolicy, ValidationError, BINANCE_BASE_URL, COINGECKO_BASE_URL};
use serde::Deserialize;

use crate::error::CliError;

const ENV_PREFIX: &str = "MARKETAGG";
const DEFAULT_FILE: &str = "marketagg";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub service: ServiceSettings,
    pub cache: CacheSettings,
    pub upstream: UpstreamSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// `*` or an empty list allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            cors_origins: vec![String::from("*")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub name: String,
    pub version: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: String::from("marketagg"),
            version: String::from(env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ticker_secs: u64,
    pub ticker_fallback_secs: u64,
    pub klines_secs: u64,
    pub depth_secs: u64,
    /// Background purge period for `serve`; `0` disables the sweeper.
    pub sweep_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let policy = CachePolicy::default();
        Self {
            ticker_secs: policy.ticker.as_secs(),
            ticker_fallback_secs: policy.ticker_fallback.as_secs(),
            klines_secs: policy.klines.as_secs(),
            depth_secs: policy.depth.as_secs(),
            sweep_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    pub binance_base_url: String,
    pub binance_timeout_ms: u64,
    pub coingecko_base_url: String,
    pub coingecko_timeout_ms: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            binance_base_url: String::from(BINANCE_BASE_URL),
            binance_timeout_ms: 10_000,
            coingecko_base_url: String::from(COINGECKO_BASE_URL),
            coingecko_timeout_ms: 15_000,
        }
    }
}

impl Settings {
    /// Loads `path` (or `marketagg.toml` from the working directory when
    /// present) and applies the process environment on top.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        Self::load_from(path, environment())
    }

    pub fn load_from(path: Option<&Path>, environment: Environment) -> Result<Self, CliError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };

        let settings: Self = Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        tracing::debug!(?settings, "settings loaded");
        Ok(settings)
    }

    pub fn cache_policy(&self) -> Result<CachePolicy, ValidationError> {
        let policy = CachePolicy {
            ticker: Duration::from_secs(self.cache.ticker_secs),
            ticker_fallback: Duration::from_secs(self.cache.ticker_fallback_secs),
            klines: Duration::from_secs(self.cache.klines_secs),
            depth: Duration::from_secs(self.cache.depth_secs),
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn sweep_period(&self) -> Option<Duration> {
        (self.cache.sweep_secs > 0).then(|| Duration::from_secs(self.cache.sweep_secs))
    }
}

/// Environment source with `__` separators and a comma-separated CORS list.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("server.cors_origins")
        .try_parsing(true)
}
