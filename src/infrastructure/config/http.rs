//! Outbound HTTP client settings.

use serde::Deserialize;

/// Timeouts applied to upstream requests.
///
/// Individual calls may pass a longer timeout (historical chart data, bulk
/// disclosure files); these are the defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Default per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Timeout for large payloads (history, disclosure dumps) in milliseconds.
    pub long_timeout_ms: u64,
    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            long_timeout_ms: 15_000,
            connect_timeout_ms: 3_000,
            user_agent: "BitcoinHub/1.0".into(),
        }
    }
}
