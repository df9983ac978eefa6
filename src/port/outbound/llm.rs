//! LLM completion port.
//!
//! Defines a generic interface for chat completion requests. Used by the
//! prediction, sentiment and chat services.

use async_trait::async_trait;

use crate::error::Result;

/// Client for large language model text completion.
///
/// Implementations wrap specific providers (xAI Grok, OpenAI) and handle
/// authentication and response parsing.
///
/// # Errors
///
/// [`complete`](Self::complete) returns an error for API failures, rate
/// limits, or invalid responses. Callers treat every error as "use the
/// next fallback".
#[async_trait]
pub trait Llm: Send + Sync {
    /// Return the provider name for logging.
    fn name(&self) -> &'static str;

    /// Send a completion request and return the generated text.
    ///
    /// `system` is an optional system message placed before the prompt.
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String>;
}
