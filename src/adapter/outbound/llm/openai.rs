//! OpenAI-compatible chat completions client.
//!
//! xAI exposes the same `/chat/completions` contract as OpenAI, so one
//! client serves both providers with a different base URL, key and model.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::infrastructure::config::ProviderConfig;
use crate::port::outbound::llm::Llm;

/// Chat completions client.
#[derive(Debug, Clone)]
pub struct ChatCompletions {
    /// Provider name used in logs and errors.
    name: &'static str,
    /// HTTP client for API requests.
    client: Client,
    /// Base URL, e.g. `https://api.x.ai/v1`.
    base_url: String,
    /// API key for authentication.
    api_key: String,
    /// Model identifier.
    model: String,
    /// Maximum tokens to generate in the response.
    max_tokens: usize,
    /// Sampling temperature.
    temperature: f64,
    timeout: Duration,
}

impl ChatCompletions {
    /// Create a client for `name` at `base_url`.
    #[must_use]
    pub fn new(
        name: &'static str,
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        settings: &ProviderConfig,
    ) -> Self {
        Self {
            name,
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(60),
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: usize,
    temperature: f64,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct Response {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl Llm for ChatCompletions {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(Message {
                role: "system",
                content: system,
            });
        }
        messages.push(Message {
            role: "user",
            content: prompt,
        });

        let request = Request {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages,
        };

        debug!(provider = self.name, model = %self.model, "Requesting completion");

        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                source_name: self.name,
                status: status.as_u16(),
            });
        }

        let body: Response = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::invalid(self.name, "no completion content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn settings() -> ProviderConfig {
        ProviderConfig {
            model: "grok-2-1212".into(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    fn client(base: &str) -> ChatCompletions {
        ChatCompletions::new("xai", Client::new(), base, "test-key", &settings())
    }

    #[test]
    fn request_serialization() {
        let request = Request {
            model: "grok-2-1212",
            max_tokens: 1000,
            temperature: 0.7,
            messages: vec![
                Message {
                    role: "system",
                    content: "be brief",
                },
                Message {
                    role: "user",
                    content: "hi",
                },
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "grok-2-1212");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        assert_eq!(
            client("https://api.x.ai/v1/").endpoint(),
            "https://api.x.ai/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn returns_first_choice() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "grok-2-1212",
                "max_tokens": 1000
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Hi there"}}]}"#)
            .create_async()
            .await;

        let reply = client(&server.url()).complete(None, "hello").await.unwrap();
        assert_eq!(reply, "Hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limit_status_is_upstream_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":"rate limit"}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .complete(Some("sys"), "hello")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream {
                source_name: "xai",
                status: 429
            }
        ));
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn empty_choices_is_invalid() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = client(&server.url()).complete(None, "x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }));
    }
}

/// Integration tests that require real API access.
/// Run with: `cargo test --features integration-tests -- --ignored`
#[cfg(all(test, feature = "integration-tests"))]
mod integration_tests {
    use super::*;
    use crate::infrastructure::config::LlmConfig;

    #[tokio::test]
    #[ignore = "requires XAI_API_KEY and network access"]
    async fn grok_says_hello() {
        let Ok(key) = std::env::var("XAI_API_KEY") else {
            eprintln!("Skipping xAI integration test: XAI_API_KEY not set");
            return;
        };
        let client = ChatCompletions::new(
            "xai",
            Client::new(),
            "https://api.x.ai/v1",
            key,
            &LlmConfig::default().xai,
        );
        let reply = client
            .complete(None, "Say 'hello' and nothing else.")
            .await
            .expect("API call failed");
        assert!(reply.to_lowercase().contains("hello"));
    }
}
