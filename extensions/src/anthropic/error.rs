use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use flexiona_core::enrich::EnrichError;

/// Error body returned by the Anthropic API.
#[derive(Deserialize, Debug, Clone)]
pub struct AnthropicErrorResponse {
    pub error: AnthropicErrorDetail,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AnthropicErrorDetail {
    /// Error category (e.g., "authentication_error", "overloaded_error").
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Errors of the Anthropic client, converted into [`EnrichError`] at the trait boundary.
#[derive(Error, Debug)]
pub enum AnthropicError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse response body ({context}): {source}")]
    ResponseParsing {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Anthropic API error: status={status}, message='{body_text}'")]
    ApiError {
        status: StatusCode,
        detail: Option<AnthropicErrorDetail>,
        body_text: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The model replied, but not in the shape the prompt asked for.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Turns a non-success response into [`AnthropicError::ApiError`].
///
/// The body is parsed as an Anthropic error object when possible; otherwise only the raw
/// text is kept.
pub(crate) async fn map_response_error(response: reqwest::Response) -> AnthropicError {
    let status = response.status();

    match response.text().await {
        Ok(body_text) => {
            let detail = match serde_json::from_str::<AnthropicErrorResponse>(&body_text) {
                Ok(parsed) => Some(parsed.error),
                Err(parse_err) => {
                    warn!(%status, error = %parse_err, "Failed to parse Anthropic error response");
                    None
                }
            };
            AnthropicError::ApiError { status, detail, body_text }
        }
        Err(e) => {
            warn!(%status, error = %e, "Failed to read Anthropic error response body");
            AnthropicError::Network(e)
        }
    }
}

impl From<AnthropicError> for EnrichError {
    fn from(err: AnthropicError) -> Self {
        match err {
            AnthropicError::Network(source) => EnrichError::Network(Box::new(source)),
            AnthropicError::ResponseParsing { .. } => EnrichError::Provider(Box::new(err)),
            AnthropicError::ApiError { status, detail, body_text } => EnrichError::Api {
                status: status.as_u16(),
                message: detail
                    .map(|d| format!("{} ({})", d.message, d.kind))
                    .unwrap_or(body_text),
            },
            AnthropicError::InvalidConfiguration(msg) => EnrichError::Configuration(msg),
            AnthropicError::UnexpectedResponse(msg) => EnrichError::InvalidResponse(msg),
        }
    }
}
