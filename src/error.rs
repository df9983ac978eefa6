use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Upstream answered, but with a non-success status.
    #[error("{source_name} returned status {status}")]
    Upstream {
        source_name: &'static str,
        status: u16,
    },

    /// Upstream answered 2xx with a body that failed the shape check.
    #[error("invalid response from {source_name}: {reason}")]
    InvalidResponse {
        source_name: &'static str,
        reason: String,
    },

    /// Every source in a fallback chain failed and no default applies.
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// A completion provider was asked for but no API key is configured.
    #[error("LLM provider {0} is not configured")]
    LlmUnavailable(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a failed shape check.
    pub fn invalid(source_name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            source_name,
            reason: reason.into(),
        }
    }

    /// Whether the failure looks like provider-side throttling.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        if let Self::Upstream { status: 429, .. } = self {
            return true;
        }
        if let Self::Http(err) = self {
            if err.status().is_some_and(|s| s.as_u16() == 429) {
                return true;
            }
        }
        let text = self.to_string().to_lowercase();
        text.contains("429") || text.contains("rate limit") || text.contains("credits")
    }
}
