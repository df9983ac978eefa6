//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; API keys come from environment
//! variables only.
//!
//! # Example
//!
//! ```no_run
//! use bitcoin_hub::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::cache::CacheConfig;
use super::http::HttpConfig;
use super::llm::LlmConfig;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Every section is optional; an empty file yields the production defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inbound HTTP server.
    pub server: ServerConfig,

    /// Logging and tracing configuration.
    pub logging: LoggingConfig,

    /// Outbound request timeouts.
    pub http: HttpConfig,

    /// Third-party API base URLs.
    pub upstream: UpstreamConfig,

    /// Cache lifetimes.
    pub cache: CacheConfig,

    /// Completion provider settings.
    pub llm: LlmConfig,

    /// Secrets, populated from the environment after parsing.
    #[serde(skip)]
    pub keys: ApiKeys,
}

/// API keys read from the environment.
#[derive(Clone, Default)]
pub struct ApiKeys {
    pub xai: Option<String>,
    pub openai: Option<String>,
    pub coingecko: Option<String>,
    pub fred: Option<String>,
    pub finnhub: Option<String>,
    pub fmp: Option<String>,
    pub news: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| if k.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("ApiKeys")
            .field("xai", &mask(&self.xai))
            .field("openai", &mask(&self.openai))
            .field("coingecko", &mask(&self.coingecko))
            .field("fred", &mask(&self.fred))
            .field("finnhub", &mask(&self.finnhub))
            .field("fmp", &mask(&self.fmp))
            .field("news", &mask(&self.news))
            .finish()
    }
}

impl ApiKeys {
    /// Read every key from its environment variable. Empty values count as unset.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            xai: var("XAI_API_KEY"),
            openai: var("OPENAI_API_KEY"),
            coingecko: var("COINGECKO_API_KEY"),
            fred: var("FRED_API_KEY"),
            finnhub: var("FINNHUB_API_KEY"),
            fmp: var("FMP_API_KEY"),
            news: var("NEWS_API_KEY"),
        }
    }

    /// `(env var, present)` pairs for diagnostics.
    #[must_use]
    pub fn presence(&self) -> [(&'static str, bool); 7] {
        [
            ("XAI_API_KEY", self.xai.is_some()),
            ("OPENAI_API_KEY", self.openai.is_some()),
            ("COINGECKO_API_KEY", self.coingecko.is_some()),
            ("FRED_API_KEY", self.fred.is_some()),
            ("FINNHUB_API_KEY", self.finnhub.is_some()),
            ("FMP_API_KEY", self.fmp.is_some()),
            ("NEWS_API_KEY", self.news.is_some()),
        ]
    }
}

impl Config {
    /// Load configuration from a TOML file and read API keys from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config = Self::parse_toml(&content)?;
        config.keys = ApiKeys::from_env();
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise start from defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be parsed or fails validation.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }
        let config = Self {
            keys: ApiKeys::from_env(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string without touching the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port",
                reason: "must be non-zero".into(),
            }
            .into());
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "server.host",
            }
            .into());
        }
        if self.http.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_ms",
                reason: "must be non-zero".into(),
            }
            .into());
        }
        for (field, url) in self.upstream.fields() {
            if url.trim().is_empty() {
                return Err(ConfigError::MissingField { field }.into());
            }
        }
        for (field, secs) in self.cache.fields() {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "TTL must be at least one second".into(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Socket address string for the inbound server.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
