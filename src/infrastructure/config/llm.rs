//! Completion provider configuration.
//!
//! API keys are read from `XAI_API_KEY` and `OPENAI_API_KEY` at runtime and
//! never from the config file.

use serde::Deserialize;

/// Settings for both OpenAI-compatible providers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// xAI Grok, used for predictions, news sentiment and chat.
    pub xai: ProviderConfig,
    /// OpenAI, used for chat when no xAI key is present.
    pub openai: ProviderConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            xai: ProviderConfig {
                model: "grok-2-1212".into(),
                temperature: 0.7,
                max_tokens: 3000,
            },
            openai: ProviderConfig {
                model: "gpt-4o-mini".into(),
                temperature: 0.7,
                max_tokens: 800,
            },
        }
    }
}

/// Per-provider generation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum tokens in response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_temperature() -> f64 {
    0.7
}

const fn default_max_tokens() -> usize {
    1000
}
