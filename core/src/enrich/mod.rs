//! Content enrichment: color palettes, summaries and keywords derived from a post.

mod error;

use async_trait::async_trait;

pub use error::EnrichError;

/// Palette used when no enrichment backend is available.
pub const PLACEHOLDER_COLORS: [&str; 5] = ["#2c3e50", "#e74c3c", "#ecf0f1", "#3498db", "#2ecc71"];

pub const PLACEHOLDER_SUMMARY: &str = "This is an automatically generated summary of the article.";

pub const PLACEHOLDER_KEYWORDS: [&str; 5] =
    ["academic", "research", "knowledge", "analysis", "theory"];

/// Number of colors in a generated palette.
pub const PALETTE_SIZE: usize = 5;

/// A backend that derives metadata from the text of a post.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Returns [`PALETTE_SIZE`] hex color codes matching the mood of the post.
    async fn generate_color_scheme(
        &self,
        title: &str,
        content_sample: &str,
    ) -> Result<Vec<String>, EnrichError>;

    /// Returns a summary of at most `max_length` characters.
    async fn generate_summary(
        &self,
        content: &str,
        max_length: usize,
    ) -> Result<String, EnrichError>;

    /// Returns up to `count` keywords describing the post.
    async fn extract_keywords(
        &self,
        content: &str,
        count: usize,
    ) -> Result<Vec<String>, EnrichError>;
}

/// Enricher returning fixed values. Needs no credentials and never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEnricher;

impl PlaceholderEnricher {
    pub fn colors() -> Vec<String> {
        PLACEHOLDER_COLORS.iter().map(|c| c.to_string()).collect()
    }

    pub fn summary(max_length: usize) -> String {
        truncate_chars(PLACEHOLDER_SUMMARY, max_length).to_string()
    }

    pub fn keywords(count: usize) -> Vec<String> {
        PLACEHOLDER_KEYWORDS
            .iter()
            .take(count)
            .map(|k| k.to_string())
            .collect()
    }
}

#[async_trait]
impl Enricher for PlaceholderEnricher {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn generate_color_scheme(
        &self,
        _title: &str,
        _content_sample: &str,
    ) -> Result<Vec<String>, EnrichError> {
        Ok(Self::colors())
    }

    async fn generate_summary(
        &self,
        _content: &str,
        max_length: usize,
    ) -> Result<String, EnrichError> {
        Ok(Self::summary(max_length))
    }

    async fn extract_keywords(
        &self,
        _content: &str,
        count: usize,
    ) -> Result<Vec<String>, EnrichError> {
        Ok(Self::keywords(count))
    }
}

/// Returns the longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Checks for a `#rgb` or `#rrggbb` color code.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => {
            (digits.len() == 3 || digits.len() == 6)
                && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn placeholder_values() {
        let enricher = PlaceholderEnricher;
        let colors = enricher.generate_color_scheme("Title", "text").await.unwrap();
        assert_eq!(colors, vec!["#2c3e50", "#e74c3c", "#ecf0f1", "#3498db", "#2ecc71"]);
        assert!(colors.iter().all(|c| is_hex_color(c)));

        let summary = enricher.generate_summary("text", 150).await.unwrap();
        assert_eq!(summary, PLACEHOLDER_SUMMARY);

        let keywords = enricher.extract_keywords("text", 3).await.unwrap();
        assert_eq!(keywords, vec!["academic", "research", "knowledge"]);
        assert_eq!(enricher.extract_keywords("text", 10).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn placeholder_summary_respects_max_length() {
        let summary = PlaceholderEnricher.generate_summary("text", 10).await.unwrap();
        assert_eq!(summary, "This is an");
    }

    #[test]
    fn truncate_on_char_boundary() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn hex_colors() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#A1b2C3"));
        assert!(!is_hex_color("fff"));
        assert!(!is_hex_color("#ffff"));
        assert!(!is_hex_color("#gggggg"));
    }
}
