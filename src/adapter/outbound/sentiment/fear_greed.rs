//! Crypto fear & greed index.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::infrastructure::http::HttpFetcher;

const SOURCE: &str = "fear-greed";

#[derive(Debug, Clone)]
pub struct FearGreed {
    http: HttpFetcher,
    url: String,
}

#[derive(Deserialize)]
struct Current {
    value: Option<Value>,
}

impl FearGreed {
    /// `url` is the full address of the current-value endpoint.
    #[must_use]
    pub fn new(http: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Current index value, 0 to 100. A missing or unreadable value reads
    /// as 50.
    pub async fn current(&self) -> Result<f64> {
        let url = url::Url::parse(&self.url)?;
        let body: Current = self.http.get_json(SOURCE, &url).await?;
        let value = match body.value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        Ok(value.filter(|v| *v != 0.0).unwrap_or(50.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::HttpConfig;
    use mockito::Server;

    async fn read(body: &str) -> f64 {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/fear-greed/current")
            .with_body(body)
            .create_async()
            .await;
        let url = format!("{}/fear-greed/current", server.url());
        FearGreed::new(HttpFetcher::from_config(&HttpConfig::default()), url)
            .current()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn numeric_and_string_values() {
        assert_eq!(read(r#"{"value":72}"#).await, 72.0);
        assert_eq!(read(r#"{"value":"31"}"#).await, 31.0);
        assert_eq!(read(r#"{}"#).await, 50.0);
    }
}
