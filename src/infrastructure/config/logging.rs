//! Logging configuration and initialization.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for this service's own events, or a full filter directive.
    pub level: String,
    /// Level for per-request traces from the HTTP layer.
    pub request_level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Filter directives built from the configured levels.
    ///
    /// Third-party crates only report warnings. A `level` that already
    /// names targets (contains `=` or `,`) is used as is.
    #[must_use]
    pub fn directives(&self) -> String {
        let level = self.level.trim();
        if level.contains('=') || level.contains(',') {
            return level.to_string();
        }
        format!(
            "warn,bitcoin_hub={level},tower_http={}",
            self.request_level.trim()
        )
    }

    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// `RUST_LOG` takes precedence over the configured levels.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.directives()))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            request_level: "info".into(),
            format: "pretty".into(),
        }
    }
}
