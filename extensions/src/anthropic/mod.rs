//! Content enrichment backed by the Anthropic Messages API.

mod error;
mod shared;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use flexiona_core::enrich::{is_hex_color, truncate_chars, EnrichError, Enricher, PALETTE_SIZE};

pub use error::{AnthropicError, AnthropicErrorDetail};
pub use shared::AnthropicConfig;
use shared::AnthropicClient;

/// Characters of the content sample included in the color prompt.
const COLOR_PROMPT_SAMPLE: usize = 500;

/// [`Enricher`] that asks a Claude model for palettes, summaries and keywords.
#[derive(Clone, Debug)]
pub struct AnthropicEnricher {
    client: AnthropicClient,
}

impl AnthropicEnricher {
    pub fn new(config: AnthropicConfig) -> Result<Self, AnthropicError> {
        Self::new_with_client(config, None)
    }

    pub fn new_with_client(
        config: AnthropicConfig,
        client_override: Option<Client>,
    ) -> Result<Self, AnthropicError> {
        Ok(Self {
            client: AnthropicClient::new(config, client_override)?,
        })
    }

    pub fn model_id(&self) -> &str {
        self.client.config().model_id()
    }

    async fn json_array(&self, prompt: &str) -> Result<Vec<String>, AnthropicError> {
        let reply = self.client.complete(prompt).await?;
        extract_json_array(&reply).ok_or_else(|| {
            AnthropicError::UnexpectedResponse(format!(
                "Expected a JSON array of strings, got: {}",
                reply.trim()
            ))
        })
    }
}

#[async_trait]
impl Enricher for AnthropicEnricher {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, content_sample))]
    async fn generate_color_scheme(
        &self,
        title: &str,
        content_sample: &str,
    ) -> Result<Vec<String>, EnrichError> {
        let prompt = color_prompt(title, truncate_chars(content_sample, COLOR_PROMPT_SAMPLE));
        let colors = self.json_array(&prompt).await?;

        if let Some(invalid) = colors.iter().find(|c| !is_hex_color(c.trim())) {
            return Err(EnrichError::InvalidResponse(format!("Not a hex color: {invalid}")));
        }
        if colors.len() < PALETTE_SIZE {
            return Err(EnrichError::InvalidResponse(format!(
                "Expected {PALETTE_SIZE} colors, got {}",
                colors.len()
            )));
        }

        let colors: Vec<String> = colors
            .iter()
            .take(PALETTE_SIZE)
            .map(|c| c.trim().to_string())
            .collect();
        debug!(?colors, "Generated color scheme");
        Ok(colors)
    }

    #[instrument(skip(self, content))]
    async fn generate_summary(
        &self,
        content: &str,
        max_length: usize,
    ) -> Result<String, EnrichError> {
        let reply = self.client.complete(&summary_prompt(content, max_length)).await?;
        let summary = truncate_chars(reply.trim(), max_length).trim_end().to_string();
        debug!(chars = summary.chars().count(), "Generated summary");
        Ok(summary)
    }

    #[instrument(skip(self, content))]
    async fn extract_keywords(
        &self,
        content: &str,
        count: usize,
    ) -> Result<Vec<String>, EnrichError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let keywords: Vec<String> = self
            .json_array(&keywords_prompt(content, count))
            .await?
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .take(count)
            .collect();
        debug!(?keywords, "Extracted keywords");
        Ok(keywords)
    }
}

fn color_prompt(title: &str, content: &str) -> String {
    format!(
        "You are a skilled UI designer with expertise in color theory.\n\
         Generate an elegant {PALETTE_SIZE}-color palette (in HEX format) for an academic article titled:\n\
         \"{title}\"\n\n\
         The article begins with:\n\
         {content}\n\n\
         Provide only the HEX codes in a JSON array format, no explanations."
    )
}

fn summary_prompt(content: &str, max_length: usize) -> String {
    format!(
        "Summarize the following academic article in no more than {max_length} characters:\n\n\
         {content}\n\n\
         Provide only the summary with no additional text."
    )
}

fn keywords_prompt(content: &str, count: usize) -> String {
    format!(
        "Extract exactly {count} main keywords from the following academic article:\n\n\
         {content}\n\n\
         Provide only the keywords as a JSON array, no explanations."
    )
}

/// Parses a JSON array of strings from a model reply, tolerating surrounding prose or code
/// fences.
fn extract_json_array(reply: &str) -> Option<Vec<String>> {
    let reply = reply.trim();
    if let Ok(values) = serde_json::from_str::<Vec<String>>(reply) {
        return Some(values);
    }
    let start = reply.find('[')?;
    let end = reply.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&reply[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_array() {
        assert_eq!(
            extract_json_array(r##"["#112233", "#445566"]"##),
            Some(vec!["#112233".to_string(), "#445566".to_string()])
        );
    }

    #[test]
    fn extracts_array_wrapped_in_prose() {
        let reply = "Here are the keywords:\n```json\n[\"rust\", \"async\"]\n```\nEnjoy!";
        assert_eq!(extract_json_array(reply), Some(vec!["rust".to_string(), "async".to_string()]));
    }

    #[test]
    fn rejects_non_arrays() {
        assert_eq!(extract_json_array("no array here"), None);
        assert_eq!(extract_json_array("] backwards ["), None);
        assert_eq!(extract_json_array("[1, 2]"), None);
    }

    #[test]
    fn prompts_mention_limits() {
        assert!(color_prompt("Title", "Body").contains("\"Title\""));
        assert!(color_prompt("Title", "Body").contains("5-color palette"));
        assert!(summary_prompt("Body", 150).contains("no more than 150 characters"));
        assert!(keywords_prompt("Body", 3).contains("exactly 3 main keywords"));
    }
}
