//! Shared outbound HTTP client.
//!
//! A thin wrapper over one `reqwest::Client` with per-request timeouts and
//! status/shape handling. It never retries: services express "try another
//! source" themselves.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::infrastructure::config::HttpConfig;

/// Per-request options.
#[derive(Debug, Default, Clone)]
pub struct RequestOptions {
    /// Extra headers (API keys, Accept).
    pub headers: Vec<(&'static str, String)>,
    /// Use the long timeout (history, bulk disclosure files).
    pub long: bool,
}

impl RequestOptions {
    #[must_use]
    pub fn long() -> Self {
        Self {
            long: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// HTTP client for upstream REST APIs.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: HttpClient,
    timeout: Duration,
    long_timeout: Duration,
}

impl HttpFetcher {
    #[must_use]
    pub fn from_config(config: &HttpConfig) -> Self {
        let http = HttpClient::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            timeout: Duration::from_millis(config.timeout_ms),
            long_timeout: Duration::from_millis(config.long_timeout_ms.max(config.timeout_ms)),
        }
    }

    /// The underlying client, for adapters that need to POST.
    #[must_use]
    pub fn client(&self) -> &HttpClient {
        &self.http
    }

    /// Default per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and decode the JSON body.
    pub async fn get_json<T>(&self, source: &'static str, url: &Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.get_json_with(source, url, &RequestOptions::default())
            .await
    }

    /// GET `url` with options and decode the JSON body.
    ///
    /// # Errors
    ///
    /// [`Error::Http`] for transport failures and timeouts,
    /// [`Error::Upstream`] for non-2xx statuses, [`Error::Json`] when the
    /// body does not match `T`.
    pub async fn get_json_with<T>(
        &self,
        source: &'static str,
        url: &Url,
        options: &RequestOptions,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.get_bytes(source, url, options).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET `url` and return the body as text (RSS feeds).
    pub async fn get_text(&self, source: &'static str, url: &Url) -> Result<String> {
        let body = self
            .get_bytes(source, url, &RequestOptions::default())
            .await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn get_bytes(
        &self,
        source: &'static str,
        url: &Url,
        options: &RequestOptions,
    ) -> Result<Vec<u8>> {
        let timeout = if options.long {
            self.long_timeout
        } else {
            self.timeout
        };

        debug!(source, path = url.path(), "GET upstream");

        let mut request = self
            .http
            .get(url.clone())
            .timeout(timeout)
            .header("Accept", "application/json");
        for (name, value) in &options.headers {
            request = request.header(*name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                source_name: source,
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Join `base` and `path` and append query parameters.
///
/// # Errors
///
/// Returns [`Error::Url`] when the joined string is not a valid URL.
pub fn build_url(base: &str, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter().copied());
    }
    Ok(url)
}
