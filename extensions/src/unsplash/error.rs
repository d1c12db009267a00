use reqwest::StatusCode;
use thiserror::Error;

use flexiona_core::image::ImageSearchError;

#[derive(Error, Debug)]
pub enum UnsplashError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse search response: {0}")]
    ResponseParsing(#[source] serde_json::Error),

    #[error("Unsplash API error: status={status}, message='{body_text}'")]
    Api { status: StatusCode, body_text: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<UnsplashError> for ImageSearchError {
    fn from(err: UnsplashError) -> Self {
        match err {
            UnsplashError::Network(source) => ImageSearchError::Network(Box::new(source)),
            UnsplashError::ResponseParsing(source) => ImageSearchError::Parsing(Box::new(source)),
            UnsplashError::Api { status, body_text } => ImageSearchError::Api {
                status: status.as_u16(),
                message: body_text,
            },
            UnsplashError::InvalidConfiguration(msg) => ImageSearchError::Configuration(msg),
        }
    }
}
