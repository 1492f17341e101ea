//! Builder module for configuring and instantiating the chat provider.
//!
//! The defaults are the generation parameters the assistant runs with:
//! `gpt-4.1-mini`, at most 800 output tokens, temperature 0.7, streaming.

use crate::{
    backends::openai::OpenAI,
    chat::{ChatProvider, ProviderFactory},
    error::LLMError,
};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Upper bound on generated tokens per reply
pub const DEFAULT_MAX_TOKENS: u32 = 800;

/// Sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Builder for configuring and instantiating chat providers.
///
/// Provides a fluent interface for setting various configuration options
/// like model selection, API keys, generation parameters, etc.
#[derive(Debug, Clone, Default)]
pub struct ChatBuilder {
    /// API key for authentication with the provider
    api_key: Option<String>,
    /// Base URL for API requests (for OpenAI-compatible gateways)
    base_url: Option<String>,
    /// Model identifier/name to use
    model: Option<String>,
    /// Maximum tokens to generate in responses
    max_tokens: Option<u32>,
    /// Temperature parameter for controlling response randomness (0.0-1.0)
    temperature: Option<f32>,
    /// Request timeout duration in seconds
    timeout_seconds: Option<u64>,
}

impl ChatBuilder {
    /// Creates a new empty builder instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL for API requests.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model identifier to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the temperature for controlling response randomness (0.0-1.0).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the whole-request timeout in seconds.
    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// The model that `build()` will use.
    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Builds and returns a configured provider instance.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is set or the base URL does not parse.
    pub fn build(self) -> Result<Box<dyn ChatProvider>, LLMError> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or(LLMError::MissingCredential)?;

        let provider = OpenAI::with_config(
            api_key,
            self.base_url,
            Some(self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string())),
            Some(self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
            Some(self.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            self.timeout_seconds,
        )?;

        Ok(Box::new(provider))
    }
}

impl ProviderFactory for ChatBuilder {
    fn create(&self, api_key: &str) -> Result<Box<dyn ChatProvider>, LLMError> {
        self.clone().api_key(api_key).build()
    }
}
