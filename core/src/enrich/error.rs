use std::error::Error as StdError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Network error: {0}")]
    Network(#[source] Box<dyn StdError + Send + Sync>),

    #[error("API error: status={status}, message={message}")]
    Api { status: u16, message: String },

    /// The backend answered, but the answer could not be turned into the requested value.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider-specific error: {0}")]
    Provider(#[source] Box<dyn StdError + Send + Sync>),
}
