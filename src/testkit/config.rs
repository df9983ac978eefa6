//! Canonical test configurations.

use crate::infrastructure::config::{ApiKeys, Config, HttpConfig, UpstreamConfig};

/// Defaults with every upstream under `base` and short timeouts.
///
/// No API keys are set, so key-gated sources are skipped.
#[must_use]
pub fn at(base: &str) -> Config {
    Config {
        upstream: UpstreamConfig::all_at(base),
        http: HttpConfig {
            timeout_ms: 2_000,
            long_timeout_ms: 2_000,
            connect_timeout_ms: 500,
            ..HttpConfig::default()
        },
        keys: ApiKeys::default(),
        ..Config::default()
    }
}

/// Like [`at`] with every API key set to `"test-key"`.
#[must_use]
pub fn with_keys(base: &str) -> Config {
    let key = || Some("test-key".to_string());
    Config {
        keys: ApiKeys {
            xai: key(),
            openai: key(),
            coingecko: key(),
            fred: key(),
            finnhub: key(),
            fmp: key(),
            news: key(),
        },
        ..at(base)
    }
}

/// A port that nothing listens on, for "upstream down" cases.
pub const DEAD_BASE: &str = "http://127.0.0.1:9";
