use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, instrument, trace};
use url::Url;

use flexiona_core::image::{Credit, ImageSearchError, ImageSearcher, ImageSuggestion};

use super::error::UnsplashError;

const DEFAULT_UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";
const SEARCH_PATH: &str = "search/photos";

/// Configuration for the Unsplash search API.
#[derive(Clone, Debug)]
pub struct UnsplashConfig {
    /// Unsplash access key, sent as `Client-ID`.
    pub(crate) access_key: SecretString,
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
}

impl UnsplashConfig {
    pub fn new(access_key: SecretString) -> Result<Self, UnsplashError> {
        if access_key.expose_secret().trim().is_empty() {
            return Err(UnsplashError::InvalidConfiguration(
                "Access key cannot be empty".to_string(),
            ));
        }
        let base_url = Url::parse(DEFAULT_UNSPLASH_BASE_URL).map_err(|e| {
            UnsplashError::InvalidConfiguration(format!("Failed to parse default base URL: {}", e))
        })?;
        Ok(Self {
            access_key,
            base_url,
            timeout: Duration::from_secs(30),
        })
    }

    /// Sets a custom base URL (e.g., a proxy or a mock server).
    ///
    /// Any path on the URL is kept as a prefix of the API paths, with or without a trailing
    /// slash.
    pub fn base_url(mut self, url: &str) -> Result<Self, UnsplashError> {
        let mut base_url = Url::parse(url).map_err(|e| {
            UnsplashError::InvalidConfiguration(format!("Invalid base URL '{}': {}", url, e))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        self.base_url = base_url;
        Ok(self)
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Deserialize, Debug)]
struct Photo {
    urls: PhotoUrls,
    alt_description: Option<String>,
    user: User,
}

#[derive(Deserialize, Debug)]
struct PhotoUrls {
    regular: String,
}

#[derive(Deserialize, Debug)]
struct User {
    name: String,
    links: UserLinks,
}

#[derive(Deserialize, Debug)]
struct UserLinks {
    html: String,
}

impl Photo {
    fn into_suggestion(self, query: &str) -> ImageSuggestion {
        let alt = self
            .alt_description
            .filter(|alt| !alt.trim().is_empty())
            .unwrap_or_else(|| format!("Image related to {query}"));
        ImageSuggestion {
            url: self.urls.regular,
            alt,
            credit: Credit {
                name: self.user.name,
                link: self.user.links.html,
            },
        }
    }
}

/// [`ImageSearcher`] querying Unsplash for one landscape photo.
#[derive(Clone, Debug)]
pub struct UnsplashClient {
    config: UnsplashConfig,
    http_client: Client,
}

impl UnsplashClient {
    pub fn new(config: UnsplashConfig) -> Result<Self, UnsplashError> {
        Self::new_with_client(config, None)
    }

    #[instrument(name = "unsplash_client_new", skip(config, client_override))]
    pub fn new_with_client(
        config: UnsplashConfig,
        client_override: Option<Client>,
    ) -> Result<Self, UnsplashError> {
        let http_client = match client_override {
            Some(client) => client,
            None => Client::builder().timeout(config.timeout).build().map_err(|e| {
                UnsplashError::InvalidConfiguration(format!(
                    "Failed to build default HTTP client: {}",
                    e
                ))
            })?,
        };
        debug!(base_url = %config.base_url, "Unsplash client initialized.");
        Ok(Self { config, http_client })
    }

    /// Searches for a photo matching `query`. Returns `None` if there are no results.
    #[instrument(skip(self))]
    pub async fn search_photo(
        &self,
        query: &str,
    ) -> Result<Option<ImageSuggestion>, UnsplashError> {
        let url = self.config.base_url.join(SEARCH_PATH).map_err(|e| {
            UnsplashError::InvalidConfiguration(format!("Failed to build search URL: {}", e))
        })?;

        let response = self
            .http_client
            .get(url)
            .header(AUTHORIZATION, format!("Client-ID {}", self.config.access_key.expose_secret()))
            .query(&[("query", query), ("per_page", "1"), ("orientation", "landscape")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            error!(%status, body = %body_text, "Unsplash API returned error status");
            return Err(UnsplashError::Api { status, body_text });
        }

        let raw_body = response.text().await?;
        trace!(body = %raw_body, "Received Unsplash response body");
        let parsed: SearchResponse = serde_json::from_str(&raw_body).map_err(|e| {
            error!(parse_error = %e, "Failed to parse Unsplash search response");
            UnsplashError::ResponseParsing(e)
        })?;

        let suggestion = parsed
            .results
            .into_iter()
            .next()
            .map(|photo| photo.into_suggestion(query));
        debug!(found = suggestion.is_some(), "Unsplash search complete");
        Ok(suggestion)
    }
}

#[async_trait]
impl ImageSearcher for UnsplashClient {
    fn name(&self) -> &str {
        "unsplash"
    }

    async fn search(
        &self,
        keywords: &[String],
    ) -> Result<Option<ImageSuggestion>, ImageSearchError> {
        let query = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if query.is_empty() {
            debug!("No keywords, skipping image search");
            return Ok(None);
        }
        Ok(self.search_photo(&query).await?)
    }
}
