//! Image suggestions for posts, looked up by keyword.

use std::error::Error as StdError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PLACEHOLDER_IMAGE_URL: &str = "https://images.unsplash.com/photo-1456513080510-7bf3a84b82f8";
pub const PLACEHOLDER_IMAGE_ALT: &str = "Academic research image";
pub const PLACEHOLDER_CREDIT_NAME: &str = "Unsplash Photographer";
pub const PLACEHOLDER_CREDIT_LINK: &str = "https://unsplash.com";

/// An image proposed for a post, stored under the `suggested_image` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSuggestion {
    pub url: String,
    pub alt: String,
    pub credit: Credit,
}

/// Attribution for an [`ImageSuggestion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub name: String,
    pub link: String,
}

impl ImageSuggestion {
    pub fn placeholder() -> Self {
        ImageSuggestion {
            url: PLACEHOLDER_IMAGE_URL.to_string(),
            alt: PLACEHOLDER_IMAGE_ALT.to_string(),
            credit: Credit {
                name: PLACEHOLDER_CREDIT_NAME.to_string(),
                link: PLACEHOLDER_CREDIT_LINK.to_string(),
            },
        }
    }
}

#[derive(Error, Debug)]
pub enum ImageSearchError {
    #[error("Network error: {0}")]
    Network(#[source] Box<dyn StdError + Send + Sync>),

    #[error("API error: status={status}, message={message}")]
    Api { status: u16, message: String },

    #[error("Response parsing error: {0}")]
    Parsing(#[source] Box<dyn StdError + Send + Sync>),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// A source of images matching a set of keywords.
#[async_trait]
pub trait ImageSearcher: Send + Sync {
    fn name(&self) -> &str;

    /// Looks up one image for `keywords`. `Ok(None)` means nothing matched.
    async fn search(
        &self,
        keywords: &[String],
    ) -> Result<Option<ImageSuggestion>, ImageSearchError>;
}

/// Image searcher that always suggests the same image.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderImageSearcher;

#[async_trait]
impl ImageSearcher for PlaceholderImageSearcher {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn search(
        &self,
        _keywords: &[String],
    ) -> Result<Option<ImageSuggestion>, ImageSearchError> {
        Ok(Some(ImageSuggestion::placeholder()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn placeholder_always_suggests_an_image() {
        let image = PlaceholderImageSearcher.search(&[]).await.unwrap().unwrap();
        assert_eq!(image, ImageSuggestion::placeholder());
        assert_eq!(image.url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(image.credit.link, "https://unsplash.com");
    }

    #[test]
    fn suggestion_serializes_as_nested_mapping() {
        let value = serde_yaml::to_value(ImageSuggestion::placeholder()).unwrap();
        assert_eq!(value["alt"].as_str(), Some(PLACEHOLDER_IMAGE_ALT));
        assert_eq!(value["credit"]["name"].as_str(), Some(PLACEHOLDER_CREDIT_NAME));
    }
}
