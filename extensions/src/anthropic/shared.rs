use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, trace};
use url::Url;

use flexiona_core::config::DEFAULT_ANTHROPIC_MODEL;

use super::error::{map_response_error, AnthropicError};

const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MESSAGES_PATH: &str = "v1/messages";

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Configuration for the Anthropic Messages API.
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    pub(crate) api_key: SecretString,
    pub(crate) base_url: Url,
    pub(crate) model: String,
    pub(crate) temperature: f32,
    pub(crate) max_tokens: u32,
    /// Timeout for HTTP requests. Defaults to 60 seconds.
    pub(crate) timeout: Duration,
}

impl AnthropicConfig {
    /// Creates a configuration using the default model and endpoint.
    ///
    /// # Errors
    /// Returns `AnthropicError::InvalidConfiguration` if the API key is empty.
    pub fn new(api_key: SecretString) -> Result<Self, AnthropicError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(AnthropicError::InvalidConfiguration(
                "API key cannot be empty".to_string(),
            ));
        }

        let base_url = Url::parse(DEFAULT_ANTHROPIC_BASE_URL).map_err(|e| {
            AnthropicError::InvalidConfiguration(format!("Failed to parse default base URL: {}", e))
        })?;

        Ok(Self {
            api_key,
            base_url,
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(60),
        })
    }

    /// Sets a custom base URL (e.g., a proxy or a mock server).
    ///
    /// A path on the URL becomes a prefix of `v1/messages`. A trailing slash is optional.
    pub fn base_url(mut self, url: &str) -> Result<Self, AnthropicError> {
        let mut base_url = Url::parse(url).map_err(|e| {
            AnthropicError::InvalidConfiguration(format!("Invalid base URL '{}': {}", url, e))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        self.base_url = base_url;
        Ok(self)
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize, Debug)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Serialize, Debug)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// HTTP client for single-turn completions.
#[derive(Clone, Debug)]
pub(crate) struct AnthropicClient {
    config: AnthropicConfig,
    http_client: Client,
}

impl AnthropicClient {
    #[instrument(name = "anthropic_client_new", skip(config, client_override))]
    pub(crate) fn new(
        config: AnthropicConfig,
        client_override: Option<Client>,
    ) -> Result<Self, AnthropicError> {
        let http_client = match client_override {
            Some(client) => client,
            None => {
                debug!(timeout = ?config.timeout, "Building default HTTP client.");
                Client::builder()
                    .timeout(config.timeout)
                    .build()
                    .map_err(|e| {
                        AnthropicError::InvalidConfiguration(format!(
                            "Failed to build default HTTP client: {}",
                            e
                        ))
                    })?
            }
        };

        debug!(
            base_url = %config.base_url,
            model = %config.model,
            "Anthropic client initialized."
        );
        Ok(Self { config, http_client })
    }

    pub(crate) fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    /// Sends `prompt` as a single user message and returns the concatenated text reply.
    #[instrument(skip(self, prompt), fields(model = %self.config.model))]
    pub(crate) async fn complete(&self, prompt: &str) -> Result<String, AnthropicError> {
        let url = self.config.base_url.join(MESSAGES_PATH).map_err(|e| {
            AnthropicError::InvalidConfiguration(format!("Failed to build messages URL: {}", e))
        })?;

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![RequestMessage { role: "user", content: prompt }],
        };
        trace!(?request, "Sending Anthropic messages request");

        let response = self
            .http_client
            .post(url)
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, "Anthropic API returned error status");
            return Err(map_response_error(response).await);
        }

        let raw_body = response.text().await?;
        trace!(body = %raw_body, "Received Anthropic response body");

        let parsed: MessagesResponse = serde_json::from_str(&raw_body).map_err(|e| {
            error!(parse_error = %e, "Failed to parse Anthropic messages response");
            AnthropicError::ResponseParsing {
                context: "Parsing messages response".to_string(),
                source: e,
            }
        })?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(AnthropicError::UnexpectedResponse(
                "Response contained no text".to_string(),
            ));
        }
        debug!(chars = text.len(), "Received completion");
        Ok(text)
    }
}
